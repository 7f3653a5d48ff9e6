//! Tenancy data model and store operations
//!
//! Every model owns its SQL. Handlers never write queries themselves.
//!
//! # Models
//!
//! - `user`: Panel users and the [`user::Role`] enum
//! - `package`: Hosting plans with resource quotas
//! - `user_package`: At most one package per user
//! - `account`: Hosting accounts (a user-role user with package and primary domain)
//! - `domain`: Domains and their document roots
//! - `database`: Customer databases
//! - `database_user`: Credentials attached to a database
//! - `email_account`: Mailboxes under a domain
//! - `activity_log`: Append-only audit trail
//!
//! Tenant-owned models (`domain`, `database`, `database_user`,
//! `email_account`, `account`) implement
//! [`OwnerLookup`](crate::auth::authorization::OwnerLookup) and take an
//! owner scope (`Option<i64>`, `None` for admins) on list, count and delete.
//!
//! # Example
//!
//! ```no_run
//! use serverpanel_shared::db::pool::{create_pool, DatabaseConfig};
//! use serverpanel_shared::models::domain::Domain;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! // Only the domains owned by user 7
//! let domains = Domain::list(&pool, Some(7)).await?;
//! # let _ = domains;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod activity_log;
pub mod database;
pub mod database_user;
pub mod domain;
pub mod email_account;
pub mod package;
pub mod user;
pub mod user_package;
