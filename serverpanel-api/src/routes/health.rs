/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "pool": { "active_connections": 0, "idle_connections": 1, "total_connections": 1 }
///   }
/// }
/// ```
use axum::extract::State;
use serde::Serialize;
use serverpanel_shared::db::pool::{self, PoolStats};

use crate::{app::AppState, error::ApiResult, response::ApiResponse};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    pub pool: PoolStats,
}

/// Health check handler
///
/// A failed store probe is reported as `degraded`, not as an error status.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<HealthResponse>> {
    let database_status = match pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(err) => {
            tracing::error!(error = %err, "Database health check failed");
            "disconnected"
        }
    };

    Ok(ApiResponse::ok(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
        pool: pool::get_pool_stats(&state.db),
    }))
}
