/// Client crop endpoints
///
/// A crop belongs to one farm and the farm keeps the list of its crop ids.
/// Creating and deleting a crop update both sides.
///
/// # Endpoints
///
/// - `GET /api/clientCrops` - Crops of every farm the caller owns
/// - `POST /api/clientCrops/:farmId/crops` - Plant a crop on an owned farm
/// - `PUT /api/clientCrops/:id` - Partial update of a crop on an owned farm
/// - `DELETE /api/clientCrops/:farmId/crops/:cropId` - Remove a crop

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use fieldbook_shared::{
    auth::{
        authorization::{authorize_farm_edit, require_owner_or_admin},
        middleware::AuthContext,
    },
    models::{
        crop::{CreateCrop, Crop, UpdateCrop},
        de,
    },
    repository::{CropFilter, FarmFilter, FindOptions},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};

/// Crop fields as sent by the web app
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRequest {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub area: Option<f64>,

    #[serde(default, rename = "yield", deserialize_with = "de::lenient_f64")]
    pub crop_yield: Option<f64>,

    #[serde(default, deserialize_with = "de::lenient_date")]
    pub planting_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "de::lenient_date")]
    pub harvest_date: Option<NaiveDate>,

    pub stage: Option<String>,
}

impl CropRequest {
    /// Builds a new crop; every field but `stage` must be present and non-zero
    fn into_create(self, farm_id: Uuid) -> ApiResult<CreateCrop> {
        let missing = || ApiError::BadRequest("Missing crop fields".to_string());
        let non_zero = |v: Option<f64>| v.filter(|v| *v != 0.0);

        Ok(CreateCrop {
            farm_id,
            name: self.name.filter(|n| !n.trim().is_empty()).ok_or_else(missing)?,
            area: non_zero(self.area).ok_or_else(missing)?,
            crop_yield: non_zero(self.crop_yield).ok_or_else(missing)?,
            planting_date: self.planting_date.ok_or_else(missing)?,
            harvest_date: self.harvest_date.ok_or_else(missing)?,
            stage: self.stage,
        })
    }

    fn into_update(self) -> UpdateCrop {
        UpdateCrop {
            name: self.name,
            area: self.area,
            crop_yield: self.crop_yield,
            planting_date: self.planting_date,
            harvest_date: self.harvest_date,
            stage: self.stage,
        }
    }
}

/// Lists the crops referenced by the caller's farms
pub async fn list_crops(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Value>> {
    let farms = state
        .repos
        .farms
        .find(&FarmFilter::owned_by(auth.user_id), FindOptions::oldest_first())
        .await?;

    let ids: Vec<Uuid> = farms.into_iter().flat_map(|farm| farm.crops).collect();

    let crops = state
        .repos
        .crops
        .find(
            &CropFilter {
                farm_id: None,
                ids: Some(ids),
            },
            FindOptions::oldest_first(),
        )
        .await?;

    Ok(Json(json!({ "data": crops })))
}

/// Plants a crop on an owned farm and links it to the farm
pub async fn add_crop(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(farm_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CropRequest>,
) -> ApiResult<(StatusCode, Json<Crop>)> {
    let data = req.into_create(farm_id)?;
    authorize_farm_edit(state.repos.farms.as_ref(), &auth, farm_id).await?;

    let crop = state.repos.crops.create(data).await?;

    if !state.repos.farms.add_crop(farm_id, crop.id).await? {
        tracing::warn!(farm_id = %farm_id, crop_id = %crop.id, "Farm vanished before crop was linked");
    }

    tracing::info!(farm_id = %farm_id, crop_id = %crop.id, "Crop added");
    Ok((StatusCode::CREATED, Json(crop)))
}

/// Updates the provided fields of a crop on an owned farm
pub async fn update_crop(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CropRequest>,
) -> ApiResult<Json<Crop>> {
    let not_found = || ApiError::NotFound("Crop not found".to_string());

    let crop = state
        .repos
        .crops
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    authorize_farm_edit(state.repos.farms.as_ref(), &auth, crop.farm_id).await?;

    let updated = state
        .repos
        .crops
        .update_by_id(id, req.into_update())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(updated))
}

/// Deletes a crop of an owned farm and unlinks it
pub async fn delete_crop(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((farm_id, crop_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let denied = || ApiError::NotFound("Farm not found or access denied".to_string());

    let farm = state
        .repos
        .farms
        .find_by_id(farm_id)
        .await?
        .ok_or_else(denied)?;
    require_owner_or_admin(&auth, farm.user_id).map_err(|_| denied())?;

    state
        .repos
        .crops
        .delete_in_farm(crop_id, farm.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Crop not found".to_string()))?;

    state.repos.farms.remove_crop(farm.id, crop_id).await?;

    tracing::info!(farm_id = %farm.id, crop_id = %crop_id, "Crop deleted");
    Ok(Json(json!({ "message": "Crop deleted successfully" })))
}
