//! Customer database model
//!
//! Only the panel's record of a database is managed here. Provisioning the
//! actual schema on a database server is out of scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::authorization::OwnerLookup;

/// Engine recorded when the caller doesn't name one
pub const DEFAULT_DB_TYPE: &str = "mysql";

/// Customer database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Database {
    pub id: i64,
    pub user_id: i64,
    pub name: String,

    #[serde(rename = "type")]
    pub db_type: String,

    /// Size in bytes as last reported
    pub size: i64,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a database record
#[derive(Debug, Clone)]
pub struct CreateDatabase {
    pub user_id: i64,
    pub name: String,
    pub db_type: String,
}

impl Database {
    pub async fn create(pool: &SqlitePool, data: CreateDatabase) -> Result<Self, sqlx::Error> {
        let database = sqlx::query_as::<_, Database>(
            r#"
            INSERT INTO databases (user_id, name, db_type)
            VALUES (?, ?, ?)
            RETURNING id, user_id, name, db_type, size, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.db_type)
        .fetch_one(pool)
        .await?;

        Ok(database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let database = sqlx::query_as::<_, Database>(
            "SELECT id, user_id, name, db_type, size, created_at FROM databases WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(database)
    }

    /// Lists databases ordered by name, restricted to `scope` when given
    pub async fn list(pool: &SqlitePool, scope: Option<i64>) -> Result<Vec<Self>, sqlx::Error> {
        let databases = match scope {
            None => {
                sqlx::query_as::<_, Database>(
                    r#"
                    SELECT id, user_id, name, db_type, size, created_at
                    FROM databases
                    ORDER BY name
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
            Some(user_id) => {
                sqlx::query_as::<_, Database>(
                    r#"
                    SELECT id, user_id, name, db_type, size, created_at
                    FROM databases
                    WHERE user_id = ?
                    ORDER BY name
                    "#,
                )
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(databases)
    }

    /// Conditional delete, see [`crate::models::domain::Domain::delete`]
    ///
    /// Credentials attached to the database are removed by cascade.
    pub async fn delete(
        pool: &SqlitePool,
        id: i64,
        scope: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM databases WHERE id = ? AND (? IS NULL OR user_id = ?)")
                .bind(id)
                .bind(scope)
                .bind(scope)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool, scope: Option<i64>) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM databases WHERE ? IS NULL OR user_id = ?")
                .bind(scope)
                .bind(scope)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl OwnerLookup for Database {
    const RESOURCE: &'static str = "Database";

    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM databases WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
