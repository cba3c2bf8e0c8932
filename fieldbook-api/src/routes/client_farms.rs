/// Client farm endpoints
///
/// Clients see and edit only their own farms. Mutations on a farm go through
/// the ownership gate first.
///
/// # Endpoints
///
/// - `GET /api/clientFarms?page&limit` - One page of own farms with crops
/// - `POST /api/clientFarms` - Create a farm owned by the caller
/// - `PUT /api/clientFarms/:id` - Partial update
/// - `DELETE /api/clientFarms/:id` - Delete the farm and its crops

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use fieldbook_shared::{
    auth::{authorization::authorize_farm_edit, middleware::AuthContext},
    models::{
        de,
        farm::{CreateFarm, Farm, UpdateFarm},
    },
    services::farms::{farms_with_crops, populate_crops, FarmPage, FarmWithCrops},
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};

/// Farm fields accepted from clients and admins
///
/// `size` may arrive as a number or a numeric string.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmRequest {
    pub name: Option<String>,
    pub location: Option<String>,

    #[serde(default, deserialize_with = "de::lenient_f64")]
    #[validate(range(min = 0.0, message = "Size must not be negative"))]
    pub size: Option<f64>,

    pub soil: Option<String>,
    pub irrigation: Option<String>,

    /// Owner chosen by an admin; ignored on client routes
    pub user_id: Option<Uuid>,
}

impl FarmRequest {
    /// Name, trimmed; a farm can't be created without one
    pub fn required_name(&self) -> ApiResult<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Farm name is required".to_string()))
    }

    /// Every provided field as a partial update
    pub fn into_update(self) -> UpdateFarm {
        UpdateFarm {
            name: self.name,
            location: self.location,
            size: self.size,
            soil: self.soil,
            irrigation: self.irrigation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Missing, unparsable and zero values all fall back to 1
fn page_param(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n != 0)
        .unwrap_or(1)
}

/// Lists the caller's farms, newest first, one page at a time
///
/// Defaults are `page=1` and `limit=1`.
pub async fn list_farms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<FarmPage>> {
    let page = page_param(query.page.as_deref());
    let limit = page_param(query.limit.as_deref());

    let farms = farms_with_crops(&state.repos, auth.user_id, page, limit).await?;
    Ok(Json(farms))
}

/// Creates a farm owned by the caller
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
            user_id: auth.user_id,
            name,
            location: req.location,
            size: req.size,
            soil: req.soil,
            irrigation: req.irrigation,
            crops: Vec::new(),
        })
        .await?;

    tracing::info!(farm_id = %farm.id, user_id = %auth.user_id, "Farm created");
    Ok((StatusCode::CREATED, Json(farm)))
}

/// Updates the provided fields of an owned farm
///
/// The owner and the crop list can't be changed here.
pub async fn update_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FarmRequest>,
) -> ApiResult<Json<FarmWithCrops>> {
    authorize_farm_edit(state.repos.farms.as_ref(), &auth, id).await?;
    req.validate()?;

    let farm = state
        .repos
        .farms
        .update_by_id(id, req.into_update())
        .await?
        .ok_or_else(|| ApiError::NotFound("Farm not found".to_string()))?;

    Ok(Json(populate_crops(&state.repos, farm).await?))
}

/// Deletes an owned farm together with its crops
pub async fn delete_farm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    authorize_farm_edit(state.repos.farms.as_ref(), &auth, id).await?;

    if !state.repos.farms.delete_by_id(id).await? {
        return Err(ApiError::NotFound("Farm not found".to_string()));
    }

    tracing::info!(farm_id = %id, user_id = %auth.user_id, "Farm deleted");
    Ok(Json(json!({ "message": "Farm and its crops deleted successfully" })))
}
