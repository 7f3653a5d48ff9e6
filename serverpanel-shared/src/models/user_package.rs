//! Package assignment
//!
//! `user_packages.user_id` is unique, so a user has at most one package.
//! Assigning again replaces the previous package.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserPackage {
    pub id: i64,
    pub user_id: i64,
    pub package_id: i64,
    pub created_at: DateTime<Utc>,
}

impl UserPackage {
    /// Assigns `package_id` to `user_id`, replacing any earlier assignment
    pub async fn assign(
        pool: &SqlitePool,
        user_id: i64,
        package_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let assignment = sqlx::query_as::<_, UserPackage>(
            r#"
            INSERT INTO user_packages (user_id, package_id)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET package_id = excluded.package_id
            RETURNING id, user_id, package_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(package_id)
        .fetch_one(pool)
        .await?;

        Ok(assignment)
    }

    /// Removes the user's assignment; false if there was none
    pub async fn unassign(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_packages WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_user(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let assignment = sqlx::query_as::<_, UserPackage>(
            "SELECT id, user_id, package_id, created_at FROM user_packages WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::package::{default_packages, Package};
    use crate::models::user::{Role, User};
    use crate::test_support::{insert_user, memory_pool};

    #[tokio::test]
    async fn test_reassign_replaces_package() {
        let pool = memory_pool().await;
        let alice = insert_user(&pool, "alice", Role::User).await;
        let mut presets = default_packages().into_iter();
        let starter = Package::create(&pool, presets.next().unwrap()).await.unwrap();
        let pro = Package::create(&pool, presets.next().unwrap()).await.unwrap();

        UserPackage::assign(&pool, alice.id, starter.id).await.unwrap();
        UserPackage::assign(&pool, alice.id, pro.id).await.unwrap();

        let current = UserPackage::find_by_user(&pool, alice.id).await.unwrap().unwrap();
        assert_eq!(current.package_id, pro.id);
        assert!(!Package::is_in_use(&pool, starter.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_assignment_goes_with_user() {
        let pool = memory_pool().await;
        let alice = insert_user(&pool, "alice", Role::User).await;
        let package = Package::create(&pool, default_packages().remove(0)).await.unwrap();

        UserPackage::assign(&pool, alice.id, package.id).await.unwrap();
        User::delete(&pool, alice.id).await.unwrap();

        assert!(!Package::is_in_use(&pool, package.id).await.unwrap());
        assert!(!UserPackage::unassign(&pool, alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_assign_unknown_package_fails() {
        let pool = memory_pool().await;
        let alice = insert_user(&pool, "alice", Role::User).await;

        assert!(UserPackage::assign(&pool, alice.id, 4242).await.is_err());
    }
}
