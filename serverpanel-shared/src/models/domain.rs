//! Domain model and store operations
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE domains (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     name TEXT NOT NULL UNIQUE,
//!     document_root TEXT NOT NULL,
//!     ssl_enabled BOOLEAN NOT NULL DEFAULT 0,
//!     ssl_expiry DATETIME,
//!     active BOOLEAN NOT NULL DEFAULT 1,
//!     created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::authorization::OwnerLookup;

/// Hosted domain
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Domain {
    pub id: i64,
    pub user_id: i64,

    /// Fully qualified name, unique across all tenants
    pub name: String,

    pub document_root: String,
    pub ssl_enabled: bool,
    pub ssl_expiry: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a domain
#[derive(Debug, Clone)]
pub struct CreateDomain {
    pub user_id: i64,
    pub name: String,
    pub document_root: String,
}

impl Domain {
    /// Document root used when the caller doesn't provide one
    pub fn default_document_root(username: &str, domain_name: &str) -> String {
        format!("/home/{}/public_html/{}", username, domain_name)
    }

    /// Creates a domain
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the name is taken by any tenant.
    pub async fn create(pool: &SqlitePool, data: CreateDomain) -> Result<Self, sqlx::Error> {
        let domain = sqlx::query_as::<_, Domain>(
            r#"
            INSERT INTO domains (user_id, name, document_root)
            VALUES (?, ?, ?)
            RETURNING id, user_id, name, document_root, ssl_enabled, ssl_expiry, active,
                      created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.document_root)
        .fetch_one(pool)
        .await?;

        Ok(domain)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let domain = sqlx::query_as::<_, Domain>(
            r#"
            SELECT id, user_id, name, document_root, ssl_enabled, ssl_expiry, active,
                   created_at
            FROM domains
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(domain)
    }

    /// Lists domains ordered by name
    ///
    /// `scope` of None lists every tenant's domains.
    pub async fn list(pool: &SqlitePool, scope: Option<i64>) -> Result<Vec<Self>, sqlx::Error> {
        let domains = match scope {
            None => {
                sqlx::query_as::<_, Domain>(
                    r#"
                    SELECT id, user_id, name, document_root, ssl_enabled, ssl_expiry, active,
                           created_at
                    FROM domains
                    ORDER BY name
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
            Some(user_id) => {
                sqlx::query_as::<_, Domain>(
                    r#"
                    SELECT id, user_id, name, document_root, ssl_enabled, ssl_expiry, active,
                           created_at
                    FROM domains
                    WHERE user_id = ?
                    ORDER BY name
                    "#,
                )
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(domains)
    }

    /// Deletes a domain within an owner scope
    ///
    /// The ownership condition is part of the statement. Returns false if no
    /// row matched.
    pub async fn delete(
        pool: &SqlitePool,
        id: i64,
        scope: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM domains WHERE id = ? AND (? IS NULL OR user_id = ?)")
            .bind(id)
            .bind(scope)
            .bind(scope)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool, scope: Option<i64>) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM domains WHERE ? IS NULL OR user_id = ?")
                .bind(scope)
                .bind(scope)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl OwnerLookup for Domain {
    const RESOURCE: &'static str = "Domain";

    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM domains WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
