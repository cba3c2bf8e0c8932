/// Audit log viewer
///
/// - `GET /api/logs` - Latest entries, newest first

use axum::{extract::State, Json};
use fieldbook_shared::{models::log::Log, repository::FindOptions};

use crate::{app::AppState, error::ApiResult};

/// Number of entries returned by the log viewer
pub const RECENT_LOG_LIMIT: i64 = 20;

pub async fn list_logs(State(state): State<AppState>) -> ApiResult<Json<Vec<Log>>> {
    let logs = state
        .repos
        .logs
        .find(FindOptions::newest_first().limit(RECENT_LOG_LIMIT))
        .await?;

    Ok(Json(logs))
}
