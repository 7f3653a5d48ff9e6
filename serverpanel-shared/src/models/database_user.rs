//! Database credentials
//!
//! A database user always belongs to the same tenant as its database; the
//! handler copies the owner over from the database when it creates one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::authorization::OwnerLookup;

/// Host pattern used when the caller doesn't give one
pub const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DatabaseUser {
    pub id: i64,
    pub user_id: i64,
    pub database_id: i64,

    #[serde(rename = "username")]
    pub db_username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub host: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDatabaseUser {
    pub user_id: i64,
    pub database_id: i64,
    pub db_username: String,
    pub password_hash: String,
    pub host: String,
}

impl DatabaseUser {
    pub async fn create(pool: &SqlitePool, data: CreateDatabaseUser) -> Result<Self, sqlx::Error> {
        let db_user = sqlx::query_as::<_, DatabaseUser>(
            r#"
            INSERT INTO database_users (user_id, database_id, db_username, password_hash, host)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, database_id, db_username, password_hash, host, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.database_id)
        .bind(data.db_username)
        .bind(data.password_hash)
        .bind(data.host)
        .fetch_one(pool)
        .await?;

        Ok(db_user)
    }

    /// Credentials of one database, ordered by username
    ///
    /// Callers gate on the database's ownership first.
    pub async fn list_by_database(
        pool: &SqlitePool,
        database_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let db_users = sqlx::query_as::<_, DatabaseUser>(
            r#"
            SELECT id, user_id, database_id, db_username, password_hash, host, created_at
            FROM database_users
            WHERE database_id = ?
            ORDER BY db_username
            "#,
        )
        .bind(database_id)
        .fetch_all(pool)
        .await?;

        Ok(db_users)
    }

    pub async fn delete(
        pool: &SqlitePool,
        id: i64,
        scope: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM database_users WHERE id = ? AND (? IS NULL OR user_id = ?)")
                .bind(id)
                .bind(scope)
                .bind(scope)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OwnerLookup for DatabaseUser {
    const RESOURCE: &'static str = "Database user";

    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM database_users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
