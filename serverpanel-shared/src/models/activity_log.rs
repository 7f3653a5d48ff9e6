//! Audit trail
//!
//! Append-only. Entries outlive the user that caused them (`user_id` is set
//! to NULL when the user is deleted).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// Maximum number of entries returned by a single listing
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: Option<i64>,

    /// Dotted action name, e.g. `domain.create`
    pub action: String,

    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub user_id: Option<i64>,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
}

impl NewActivity {
    pub fn new(user_id: i64, action: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn ip_address(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

impl ActivityLog {
    pub async fn record(pool: &SqlitePool, entry: NewActivity) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, action, details, ip_address)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, action, details, ip_address, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.details)
        .bind(entry.ip_address)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Most recent entries first; `limit` is clamped to 1..=MAX_LIST_LIMIT
    pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, user_id, action, details, ip_address, created_at
            FROM activity_logs
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.clamp(1, MAX_LIST_LIMIT))
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }
}
