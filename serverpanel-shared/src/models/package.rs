//! Hosting packages
//!
//! A package is a named bundle of quotas. Quotas are recorded and reported;
//! they are not enforced against resource creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Hosting package
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Package {
    pub id: i64,
    pub name: String,

    /// Disk quota in MiB
    pub disk_quota: i64,

    /// Monthly bandwidth in MiB
    pub bandwidth_quota: i64,

    pub max_domains: i64,
    pub max_databases: i64,
    pub max_emails: i64,
    pub max_ftp: i64,
    pub created_at: DateTime<Utc>,
}

/// Writable package fields, used for both create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInput {
    pub name: String,
    pub disk_quota: i64,
    pub bandwidth_quota: i64,
    pub max_domains: i64,
    pub max_databases: i64,
    pub max_emails: i64,
    pub max_ftp: i64,
}

impl PackageInput {
    fn preset(name: &str, quotas: [i64; 6]) -> Self {
        let [disk_quota, bandwidth_quota, max_domains, max_databases, max_emails, max_ftp] = quotas;
        Self {
            name: name.to_string(),
            disk_quota,
            bandwidth_quota,
            max_domains,
            max_databases,
            max_emails,
            max_ftp,
        }
    }
}

/// Packages seeded into an empty store
pub fn default_packages() -> Vec<PackageInput> {
    vec![
        PackageInput::preset("Starter", [1024, 10240, 1, 1, 5, 1]),
        PackageInput::preset("Professional", [5120, 51200, 5, 5, 25, 5]),
        PackageInput::preset("Business", [20480, 204800, 20, 20, 100, 20]),
    ]
}

impl Package {
    /// Creates a package
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the name exists, or a check
    /// violation for negative quotas.
    pub async fn create(pool: &SqlitePool, data: PackageInput) -> Result<Self, sqlx::Error> {
        let package = sqlx::query_as::<_, Package>(
            r#"
            INSERT INTO packages (name, disk_quota, bandwidth_quota, max_domains,
                                  max_databases, max_emails, max_ftp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, disk_quota, bandwidth_quota, max_domains, max_databases,
                      max_emails, max_ftp, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.disk_quota)
        .bind(data.bandwidth_quota)
        .bind(data.max_domains)
        .bind(data.max_databases)
        .bind(data.max_emails)
        .bind(data.max_ftp)
        .fetch_one(pool)
        .await?;

        Ok(package)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let package = sqlx::query_as::<_, Package>(
            r#"
            SELECT id, name, disk_quota, bandwidth_quota, max_domains, max_databases,
                   max_emails, max_ftp, created_at
            FROM packages
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(package)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let packages = sqlx::query_as::<_, Package>(
            r#"
            SELECT id, name, disk_quota, bandwidth_quota, max_domains, max_databases,
                   max_emails, max_ftp, created_at
            FROM packages
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(packages)
    }

    /// Replaces every writable field; None if the package doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: PackageInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let package = sqlx::query_as::<_, Package>(
            r#"
            UPDATE packages
            SET name = ?, disk_quota = ?, bandwidth_quota = ?, max_domains = ?,
                max_databases = ?, max_emails = ?, max_ftp = ?
            WHERE id = ?
            RETURNING id, name, disk_quota, bandwidth_quota, max_domains, max_databases,
                      max_emails, max_ftp, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.disk_quota)
        .bind(data.bandwidth_quota)
        .bind(data.max_domains)
        .bind(data.max_databases)
        .bind(data.max_emails)
        .bind(data.max_ftp)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(package)
    }

    /// Whether any user has this package assigned
    pub async fn is_in_use(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_packages WHERE package_id = ?)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(in_use)
    }

    /// Deletes a package
    ///
    /// Returns false if it didn't exist. An assignment that slipped in after
    /// [`Package::is_in_use`] surfaces as a foreign key violation.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM packages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
