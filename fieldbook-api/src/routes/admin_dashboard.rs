/// Admin dashboard management
///
/// # Endpoints
///
/// - `GET /api/admin/dashboard` - Every dashboard with its farm
/// - `POST /api/admin/dashboard` - Create a dashboard for a user's farm
/// - `PUT /api/admin/dashboard/:id` - Partial update
/// - `DELETE /api/admin/dashboard/:id` - Delete

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use fieldbook_shared::{
    models::dashboard::{Charts, CreateDashboard, Dashboard, Soil, UpdateDashboard, Weather},
    services::farms::{dashboards_with_farms, DashboardWithFarm},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};

/// Dashboard fields; omitted chart, weather and soil values default to empty
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRequest {
    pub user_id: Option<Uuid>,
    pub farm_id: Option<Uuid>,
    pub charts: Option<Charts>,
    pub weather: Option<Weather>,
    pub soil: Option<Soil>,
    pub upcoming_tasks: Option<Vec<String>>,
    pub image: Option<String>,
}

pub async fn list_dashboards(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DashboardWithFarm>>> {
    let dashboards = dashboards_with_farms(&state.repos).await?;

    if dashboards.is_empty() {
        return Err(ApiError::NotFound("No dashboards found".to_string()));
    }

    Ok(Json(dashboards))
}

pub async fn create_dashboard(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DashboardRequest>,
) -> ApiResult<(StatusCode, Json<Dashboard>)> {
    let (Some(user_id), Some(farm_id)) = (req.user_id, req.farm_id) else {
        return Err(ApiError::BadRequest(
            "userId and farmId are required".to_string(),
        ));
    };

    let dashboard = state
        .repos
        .dashboards
        .create(CreateDashboard {
            user_id,
            farm_id,
            charts: req.charts.unwrap_or_default(),
            weather: req.weather.unwrap_or_default(),
            soil: req.soil.unwrap_or_default(),
            upcoming_tasks: req.upcoming_tasks.unwrap_or_default(),
            image: req.image.unwrap_or_default(),
        })
        .await?;

    tracing::info!(dashboard_id = %dashboard.id, farm_id = %farm_id, "Dashboard created");
    Ok((StatusCode::CREATED, Json(dashboard)))
}

pub async fn update_dashboard(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<DashboardRequest>,
) -> ApiResult<Json<Dashboard>> {
    let update = UpdateDashboard {
        user_id: req.user_id,
        farm_id: req.farm_id,
        charts: req.charts,
        weather: req.weather,
        soil: req.soil,
        upcoming_tasks: req.upcoming_tasks,
        image: req.image,
    };

    let dashboard = state
        .repos
        .dashboards
        .update_by_id(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dashboard entry not found".to_string()))?;

    Ok(Json(dashboard))
}

pub async fn delete_dashboard(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.repos.dashboards.delete_by_id(id).await? {
        return Err(ApiError::NotFound("Dashboard entry not found".to_string()));
    }

    Ok(Json(json!({ "message": "Dashboard entry deleted successfully" })))
}
