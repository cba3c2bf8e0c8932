/// Admin farm health management
///
/// # Endpoints
///
/// - `GET /api/admin/farmhealth/:farmId` - Health of a farm with the farm's details
/// - `POST /api/admin/farmhealth` - Record health for an existing farm
/// - `PUT /api/admin/farmhealth/:id` - Merge non-empty readings
/// - `DELETE /api/admin/farmhealth/:id` - Delete a record
///
/// The `GET` path parameter is a farm id; on `PUT` and `DELETE` it is the
/// health record id.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use fieldbook_shared::{
    models::farm_health::{CreateFarmHealth, FarmHealth, UpdateFarmHealth},
    services::farm_health::{farm_health_detail, with_farm_details, FarmHealthDetail},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmHealthRequest {
    pub farm_id: Option<Uuid>,
    pub pest_pressure: Option<String>,
    pub nutrient_status: Option<String>,
    pub disease_risk: Option<String>,
}

pub async fn get_farm_health(
    State(state): State<AppState>,
    ApiPath(farm_id): ApiPath<Uuid>,
) -> ApiResult<Json<FarmHealthDetail>> {
    let detail = farm_health_detail(&state.repos, farm_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm health not found".to_string()))?;

    Ok(Json(detail))
}

/// Records farm health; the farm must exist
pub async fn create_farm_health(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FarmHealthRequest>,
) -> ApiResult<(StatusCode, Json<FarmHealthDetail>)> {
    let farm_not_found = || ApiError::NotFound("Farm not found".to_string());

    let farm_id = req.farm_id.ok_or_else(farm_not_found)?;
    state
        .repos
        .farms
        .find_by_id(farm_id)
        .await?
        .ok_or_else(farm_not_found)?;

    let health = state
        .repos
        .farm_health
        .create(CreateFarmHealth {
            farm_id,
            pest_pressure: req.pest_pressure.unwrap_or_default(),
            nutrient_status: req.nutrient_status.unwrap_or_default(),
            disease_risk: req.disease_risk.unwrap_or_default(),
        })
        .await?;

    tracing::info!(health_id = %health.id, farm_id = %farm_id, "Farm health recorded");

    let detail = with_farm_details(&state.repos, health).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Merges readings into a record; empty values keep the stored reading
pub async fn update_farm_health(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FarmHealthRequest>,
) -> ApiResult<Json<FarmHealth>> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

    let update = UpdateFarmHealth {
        pest_pressure: non_empty(req.pest_pressure),
        nutrient_status: non_empty(req.nutrient_status),
        disease_risk: non_empty(req.disease_risk),
    };

    let health = state
        .repos
        .farm_health
        .update_by_id(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm Health data not found".to_string()))?;

    Ok(Json(health))
}

pub async fn delete_farm_health(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.repos.farm_health.delete_by_id(id).await? {
        return Err(ApiError::NotFound("Farm Health data not found".to_string()));
    }

    Ok(Json(json!({ "message": "Farm Health data deleted" })))
}
