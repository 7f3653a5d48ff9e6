//! Mailbox model

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::authorization::OwnerLookup;

/// Mailbox quota in MiB when none is requested
pub const DEFAULT_QUOTA_MB: i64 = 100;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EmailAccount {
    pub id: i64,
    pub user_id: i64,
    pub domain_id: i64,
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Quota in MiB
    pub quota: i64,

    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEmailAccount {
    pub user_id: i64,
    pub domain_id: i64,
    pub email: String,
    pub password_hash: String,
    pub quota: i64,
}

impl EmailAccount {
    /// Whether `email` is an address under `domain_name`
    ///
    /// The local part must be non-empty; comparison is case-insensitive.
    pub fn belongs_to_domain(email: &str, domain_name: &str) -> bool {
        match email.rsplit_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.eq_ignore_ascii_case(domain_name),
            None => false,
        }
    }

    pub async fn create(pool: &SqlitePool, data: CreateEmailAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, EmailAccount>(
            r#"
            INSERT INTO email_accounts (user_id, domain_id, email, password_hash, quota)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, domain_id, email, password_hash, quota, active, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.domain_id)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.quota)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Lists mailboxes ordered by address, restricted to `scope` when given
    pub async fn list(pool: &SqlitePool, scope: Option<i64>) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = match scope {
            None => {
                sqlx::query_as::<_, EmailAccount>(
                    r#"
                    SELECT id, user_id, domain_id, email, password_hash, quota, active, created_at
                    FROM email_accounts
                    ORDER BY email
                    "#,
                )
                .fetch_all(pool)
                .await?
            }
            Some(user_id) => {
                sqlx::query_as::<_, EmailAccount>(
                    r#"
                    SELECT id, user_id, domain_id, email, password_hash, quota, active, created_at
                    FROM email_accounts
                    WHERE user_id = ?
                    ORDER BY email
                    "#,
                )
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(accounts)
    }

    pub async fn delete(
        pool: &SqlitePool,
        id: i64,
        scope: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM email_accounts WHERE id = ? AND (? IS NULL OR user_id = ?)")
                .bind(id)
                .bind(scope)
                .bind(scope)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool, scope: Option<i64>) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM email_accounts WHERE ? IS NULL OR user_id = ?",
        )
        .bind(scope)
        .bind(scope)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl OwnerLookup for EmailAccount {
    const RESOURCE: &'static str = "Email account";

    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM email_accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
