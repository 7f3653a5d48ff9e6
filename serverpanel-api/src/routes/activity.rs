/// Activity log endpoint (admin only)
///
/// `GET /api/v1/activity?limit=N` returns the newest entries first.
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::models::activity_log::ActivityLog;

use crate::{app::AppState, error::ApiResult, extract::ApiQuery, response::ApiResponse};

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    /// Clamped to 1..=500
    pub limit: Option<i64>,
}

pub async fn list_activity(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> ApiResult<ApiResponse<Vec<ActivityLog>>> {
    let entries =
        ActivityLog::list_recent(&state.db, query.limit.unwrap_or(DEFAULT_LIMIT)).await?;
    Ok(ApiResponse::ok(entries))
}
