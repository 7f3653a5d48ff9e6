/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, current user, logout
/// - `dashboard`: Per-tenant resource counts
/// - `domains`, `databases`, `email_accounts`: Tenant-owned resources
/// - `accounts`: Hosting accounts (user + package + primary domain)
/// - `users`, `packages`, `activity`: Admin management
use axum::http::HeaderMap;
use serverpanel_shared::models::activity_log::{ActivityLog, NewActivity};
use sqlx::SqlitePool;

pub mod accounts;
pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod databases;
pub mod domains;
pub mod email_accounts;
pub mod health;
pub mod packages;
pub mod users;

/// Appends an activity log entry
///
/// The mutation it describes has already been committed, so a failure here
/// is logged and swallowed.
pub(crate) async fn record_activity(pool: &SqlitePool, entry: NewActivity) {
    let action = entry.action.clone();
    if let Err(err) = ActivityLog::record(pool, entry).await {
        tracing::warn!(action = %action, error = %err, "Failed to record activity");
    }
}

/// Client address as reported by the reverse proxy
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Trims a required text field, rejecting blank values
pub(crate) fn required(value: &str, message: &str) -> crate::error::ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::ApiError::BadRequest(message.to_string()));
    }
    Ok(trimmed.to_string())
}
