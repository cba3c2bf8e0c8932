/// Client dashboard overview
///
/// - `GET /api/dashboard` - One overview card per dashboard of the caller

use axum::{extract::State, Extension, Json};
use fieldbook_shared::{
    auth::middleware::AuthContext,
    services::dashboard::{dashboard_overview, DashboardOverview},
};

use crate::{app::AppState, error::ApiResult};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<DashboardOverview>>> {
    let overview = dashboard_overview(&state.repos, auth.user_id).await?;
    Ok(Json(overview))
}
