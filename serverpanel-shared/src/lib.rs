//! # ServerPanel Shared Library
//!
//! Shared types and business rules used by the ServerPanel API server.
//!
//! ## Module Organization
//!
//! - `auth`: Token verification, identity context, role and ownership gates
//! - `models`: Tenancy data model and store operations
//! - `db`: Connection pool and embedded migrations
//! - `bootstrap`: One-time startup initialization (admin account, default packages)

pub mod auth;
pub mod bootstrap;
pub mod db;
pub mod models;

/// Current version of the ServerPanel shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
