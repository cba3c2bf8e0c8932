/// Personal calendar events
///
/// # Endpoints
///
/// - `GET /api/events` - Caller's events
/// - `POST /api/events` - Add an event for the caller

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use fieldbook_shared::{
    auth::middleware::AuthContext,
    models::{
        de,
        event::{CreateEvent, Event},
    },
    repository::{EventFilter, FindOptions},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};

#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    pub title: Option<String>,

    #[serde(default, deserialize_with = "de::lenient_date")]
    pub date: Option<NaiveDate>,

    pub description: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = state
        .repos
        .events
        .find(
            &EventFilter {
                user_id: Some(auth.user_id),
            },
            FindOptions::oldest_first(),
        )
        .await?;

    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<EventRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Event title is required".to_string()))?;

    let event = state
        .repos
        .events
        .create(CreateEvent {
            user_id: auth.user_id,
            title,
            date: req.date,
            description: req.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event added successfully", "event": event })),
    ))
}
