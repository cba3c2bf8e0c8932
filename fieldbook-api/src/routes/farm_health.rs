/// Farm health of the caller's own farms
///
/// - `GET /api/farmhealth/my-farms`

use axum::{extract::State, Extension, Json};
use fieldbook_shared::{
    auth::middleware::AuthContext,
    services::farm_health::{farm_health_for_user, FarmHealthSummary, MyFarmsHealth},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Lists the health record of each owned farm that has one
///
/// Answers 404 when the caller owns no farm, or when none of the farms has
/// health data yet.
pub async fn my_farms(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<FarmHealthSummary>>> {
    match farm_health_for_user(&state.repos, auth.user_id).await? {
        MyFarmsHealth::NoFarms => Err(ApiError::NotFound(
            "No farms found for this user".to_string(),
        )),
        MyFarmsHealth::NoHealthData => Err(ApiError::NotFound(
            "No health data found for user's farms".to_string(),
        )),
        MyFarmsHealth::Found(entries) => Ok(Json(entries)),
    }
}
