//! Role gate and ownership gate
//!
//! Authorization in the panel is two independent checks applied after the
//! token verifier has produced an [`AuthContext`]:
//!
//! 1. **Role gate**: a route group declares which roles may enter. Applied as
//!    a layer with [`role_gate`], or inline with [`require_role`].
//! 2. **Ownership gate**: for a tenant-owned resource addressed by id, the
//!    caller must be an admin or the resource's owner. Resources describe how
//!    their owner is found by implementing [`OwnerLookup`]; handlers call
//!    [`enforce_ownership`] before acting.
//!
//! A missing resource is reported as 404 before any ownership decision is
//! made, so the gate never has to invent an owner for a row that isn't there.
//!
//! # Example
//!
//! ```no_run
//! use serverpanel_shared::auth::authorization::enforce_ownership;
//! use serverpanel_shared::auth::middleware::AuthContext;
//! use serverpanel_shared::models::domain::Domain;
//! use sqlx::SqlitePool;
//!
//! # async fn example(pool: SqlitePool, auth: AuthContext) -> Result<(), Box<dyn std::error::Error>> {
//! // 404 if domain 12 doesn't exist, 403 if it belongs to someone else
//! let owner_id = enforce_ownership::<Domain>(&pool, &auth, 12).await?;
//! # let _ = owner_id;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use super::middleware::{AuthContext, AuthError};
use crate::models::user::Role;

/// Roles allowed on admin-only route groups
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Authenticated, but the role is not in the route's allowed set
    #[error("Insufficient permissions")]
    InsufficientRole { actual: Role },

    /// The addressed resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The resource exists and belongs to another tenant
    #[error("Permission denied")]
    Forbidden,

    /// Owner lookup failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl AuthzError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthzError::InsufficientRole { .. } | AuthzError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AuthzError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthzError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthzError::DatabaseError(e) => {
                tracing::error!(error = %e, "Ownership lookup failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Whether `role` is a member of `allowed`
///
/// An empty allowed set admits nobody.
pub fn is_role_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Checks the caller's role against a route's allowed set
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` if the role isn't allowed
pub fn require_role(auth: &AuthContext, allowed: &[Role]) -> Result<(), AuthzError> {
    if !is_role_allowed(auth.role, allowed) {
        return Err(AuthzError::InsufficientRole { actual: auth.role });
    }

    Ok(())
}

/// Role gate middleware body
///
/// Expects the JWT layer to have run already. If no [`AuthContext`] is
/// attached the request is rejected with 401 rather than let through.
pub async fn role_gate_middleware(allowed: &'static [Role], req: Request, next: Next) -> Response {
    let Some(auth) = req.extensions().get::<AuthContext>() else {
        tracing::warn!(path = %req.uri().path(), "Role gate reached without identity");
        return AuthError::MissingCredentials.into_response();
    };

    if let Err(err) = require_role(auth, allowed) {
        tracing::warn!(
            user_id = auth.user_id,
            role = auth.role.as_str(),
            path = %req.uri().path(),
            "Role gate rejected request"
        );
        return err.into_response();
    }

    next.run(req).await
}

/// Builds a role gate for `axum::middleware::from_fn`
///
/// Layer it *inside* the JWT layer (`.layer(role_gate).layer(jwt)`), so that
/// authentication runs first and an unauthenticated caller sees 401, never
/// 403.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use serverpanel_shared::auth::authorization::{role_gate, ADMIN_ONLY};
///
/// let admin_routes: Router = Router::new()
///     .route("/packages", get(|| async { "ok" }))
///     .layer(middleware::from_fn(role_gate(ADMIN_ONLY)));
/// ```
pub fn role_gate(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |req: Request, next: Next| Box::pin(role_gate_middleware(allowed, req, next))
}

/// Ownership predicate
///
/// Admins may access everything; everyone else only what they own.
pub fn can_access(auth: &AuthContext, owner_id: i64) -> bool {
    auth.is_admin() || auth.user_id == owner_id
}

/// Resolves the owner of a tenant-owned resource
///
/// Implemented by every model that can be addressed by id on a non-admin
/// route.
#[async_trait]
pub trait OwnerLookup {
    /// Human-readable resource name used in "not found" messages
    const RESOURCE: &'static str;

    /// Returns the owning user's id, or None if no row has this id
    async fn resolve_owner(pool: &SqlitePool, id: i64) -> Result<Option<i64>, sqlx::Error>;
}

/// Ownership gate
///
/// On success returns the resource's owner id.
///
/// # Errors
///
/// - `AuthzError::NotFound` if the resource doesn't exist
/// - `AuthzError::Forbidden` if the caller is neither admin nor owner
/// - `AuthzError::DatabaseError` if the lookup fails
pub async fn enforce_ownership<R: OwnerLookup>(
    pool: &SqlitePool,
    auth: &AuthContext,
    id: i64,
) -> Result<i64, AuthzError> {
    let owner_id = R::resolve_owner(pool, id)
        .await?
        .ok_or(AuthzError::NotFound(R::RESOURCE))?;

    if !can_access(auth, owner_id) {
        tracing::warn!(
            user_id = auth.user_id,
            resource = R::RESOURCE,
            resource_id = id,
            "Ownership check failed"
        );
        return Err(AuthzError::Forbidden);
    }

    Ok(owner_id)
}
