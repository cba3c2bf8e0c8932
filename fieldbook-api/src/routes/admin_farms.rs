/// Admin farm management
///
/// # Endpoints
///
/// - `GET /api/adminFarms` - Every farm with its owner
/// - `POST /api/adminFarms` - Create a farm for any user
/// - `PUT /api/adminFarms/:id` - Merge name, location and size
/// - `DELETE /api/adminFarms/:id` - Delete a farm and its crops

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use fieldbook_shared::{
    auth::{authorization::require_owner_or_admin, middleware::AuthContext},
    models::farm::{CreateFarm, Farm, UpdateFarm},
    services::farms::{farms_with_owners, FarmWithOwner},
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::client_farms::FarmRequest;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};

pub async fn list_farms(State(state): State<AppState>) -> ApiResult<Json<Vec<FarmWithOwner>>> {
    Ok(Json(farms_with_owners(&state.repos).await?))
}

/// Creates a farm owned by `userId`, or by the caller when omitted
///
/// The farm starts without crops; crops are linked when they are planted.
pub async fn create_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<FarmRequest>,
) -> ApiResult<(StatusCode, Json<Farm>)> {
    req.validate()?;
    let name = req.required_name()?;

    let farm = state
        .repos
        .farms
        .create(CreateFarm {
            user_id: req.user_id.unwrap_or(auth.user_id),
            name,
            location: req.location,
            size: req.size,
            soil: req.soil,
            irrigation: req.irrigation,
            crops: Vec::new(),
        })
        .await?;

    tracing::info!(farm_id = %farm.id, owner_id = %farm.user_id, admin_id = %auth.user_id, "Farm created by admin");
    Ok((StatusCode::CREATED, Json(farm)))
}

/// Merges name, location and size into a farm
///
/// Empty names and locations keep the stored value. Other fields, including
/// the owner, are never changed here.
pub async fn update_farm(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FarmRequest>,
) -> ApiResult<Json<Farm>> {
    req.validate()?;

    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    let update = UpdateFarm {
        name: non_empty(req.name),
        location: non_empty(req.location),
        size: req.size,
        ..Default::default()
    };

    let farm = state
        .repos
        .farms
        .update_by_id(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    Ok(Json(farm))
}

/// Deletes a farm together with its crops
pub async fn delete_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    let farm = state
        .repos
        .farms
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    require_owner_or_admin(&auth, farm.user_id)?;

    if !state.repos.farms.delete_by_id(farm.id).await? {
        return Err(ApiError::NotFound("Farm not found".to_string()));
    }

    tracing::info!(farm_id = %farm.id, admin_id = %auth.user_id, "Farm deleted by admin");
    Ok(Json(json!({ "message": "Farm deleted" })))
}
