//! Startup initialization
//!
//! Runs once after migrations, before the server accepts requests. Every step
//! is idempotent: it checks current state first and only writes when there is
//! something missing.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, PasswordError, MIN_PASSWORD_LENGTH};
use crate::models::package::{default_packages, Package};
use crate::models::user::{CreateUser, Role, User};

/// Error type for bootstrap steps
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Admin password is shorter than the minimum length")]
    WeakPassword,
}

/// Credentials for the initial admin account
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,

    /// Plaintext; hashed before it is stored. None skips admin creation.
    pub password: Option<String>,
}

/// What a bootstrap run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub admin_created: bool,
    pub packages_seeded: usize,
}

/// Creates the initial admin if no admin exists yet
///
/// Returns whether an account was created. With no admin and no configured
/// password, a warning is logged and nothing is created.
pub async fn ensure_admin(pool: &SqlitePool, seed: &AdminSeed) -> Result<bool, BootstrapError> {
    if User::admin_exists(pool).await? {
        info!("Admin account present, skipping admin bootstrap");
        return Ok(false);
    }

    let Some(password) = seed.password.as_deref() else {
        warn!("No admin account exists and ADMIN_PASSWORD is not set; nobody can log in yet");
        return Ok(false);
    };

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(BootstrapError::WeakPassword);
    }

    let admin = User::create(
        pool,
        CreateUser {
            username: seed.username.clone(),
            email: seed.email.clone(),
            password_hash: hash_password(password)?,
            role: Role::Admin,
            parent_id: None,
        },
    )
    .await?;

    info!(user_id = admin.id, username = %admin.username, "Created initial admin account");
    Ok(true)
}

/// Inserts the default packages into an empty package table
///
/// Returns the number of packages inserted (0 if any package exists).
pub async fn seed_default_packages(pool: &SqlitePool) -> Result<usize, BootstrapError> {
    if Package::count(pool).await? > 0 {
        return Ok(0);
    }

    let mut seeded = 0;
    for preset in default_packages() {
        Package::create(pool, preset).await?;
        seeded += 1;
    }

    info!(count = seeded, "Seeded default packages");
    Ok(seeded)
}

/// Runs every bootstrap step
pub async fn run(
    pool: &SqlitePool,
    admin: &AdminSeed,
    seed_packages: bool,
) -> Result<BootstrapReport, BootstrapError> {
    let admin_created = ensure_admin(pool, admin).await?;
    let packages_seeded = if seed_packages {
        seed_default_packages(pool).await?
    } else {
        0
    };

    Ok(BootstrapReport {
        admin_created,
        packages_seeded,
    })
}
