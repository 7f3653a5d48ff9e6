//! Hosting accounts
//!
//! A hosting account is a `users` row with role `user`, plus its package
//! assignment and primary domain. Provisioning creates all three in one
//! transaction.
//!
//! For ownership purposes an account is owned by itself: its owner id is the
//! account's own user id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::domain::Domain;
use super::user::Role;
use crate::auth::authorization::OwnerLookup;

/// Account summary as shown to admins
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,

    /// Admin or reseller that provisioned the account
    pub parent_id: Option<i64>,

    pub package_id: Option<i64>,
    pub package_name: Option<String>,

    /// First domain created for the account
    pub domain: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for provisioning an account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub domain: String,
    pub package_id: i64,
    pub parent_id: i64,
}

impl Account {
    /// Provisions user, package assignment and primary domain atomically
    ///
    /// # Errors
    ///
    /// Any failure (taken username, email or domain, unknown package) rolls
    /// the whole account back.
    pub async fn create(pool: &SqlitePool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let document_root = Domain::default_document_root(&data.username, &data.domain);

        let mut tx = pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, role, parent_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(Role::User)
        .bind(data.parent_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_packages (user_id, package_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(data.package_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO domains (user_id, name, document_root) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&data.domain)
            .bind(&document_root)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Self::find_by_id(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT u.id, u.username, u.email, u.active, u.parent_id, u.created_at,
                   up.package_id, p.name AS package_name,
                   (SELECT d.name FROM domains d WHERE d.user_id = u.id
                    ORDER BY d.id LIMIT 1) AS domain
            FROM users u
            LEFT JOIN user_packages up ON up.user_id = u.id
            LEFT JOIN packages p ON p.id = up.package_id
            WHERE u.id = ? AND u.role = 'user'
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Lists all hosting accounts ordered by username
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT u.id, u.username, u.email, u.active, u.parent_id, u.created_at,
                   up.package_id, p.name AS package_name,
                   (SELECT d.name FROM domains d WHERE d.user_id = u.id
                    ORDER BY d.id LIMIT 1) AS domain
            FROM users u
            LEFT JOIN user_packages up ON up.user_id = u.id
            LEFT JOIN packages p ON p.id = up.package_id
            WHERE u.role = 'user'
            ORDER BY u.username
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Suspends (false) or reactivates (true) an account
    ///
    /// Returns false if no hosting account has this id.
    pub async fn set_active(pool: &SqlitePool, id: i64, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND role = 'user'
            "#,
        )
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes an account and, by cascade, everything it owns
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role = 'user'")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OwnerLookup for Account {
    const RESOURCE: &'static str = "Account";

    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM users WHERE id = ? AND role = 'user'")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
