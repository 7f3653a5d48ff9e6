//! Identity context and authentication middleware for Axum
//!
//! The token verifier is the only trust boundary in the panel. Once a bearer
//! token checks out, its claims become an [`AuthContext`] that is attached to
//! the request and read, never re-derived, by everything downstream.
//!
//! Two entry points produce the context:
//!
//! - [`jwt_auth_middleware`]: a layer for whole route groups, rejecting
//!   unauthenticated requests before routing reaches a handler
//! - the [`AuthContext`] extractor: handlers take `auth: AuthContext` as an
//!   argument. It reuses the context attached by the layer and otherwise
//!   verifies the header itself, so a handler with that argument cannot run
//!   without authentication even if it is mounted outside the layer.
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use serverpanel_shared::auth::middleware::{jwt_auth_middleware, AuthContext, JwtSecret};
//!
//! async fn whoami(auth: AuthContext) -> String {
//!     format!("{} ({})", auth.username, auth.role.as_str())
//! }
//!
//! let secret = JwtSecret::new("an-example-secret-that-is-32-bytes!");
//! let app: Router = Router::new()
//!     .route("/me", get(whoami))
//!     .layer(middleware::from_fn_with_state(secret.clone(), jwt_auth_middleware))
//!     .with_state(secret);
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::Role;

/// Shared secret used to verify access tokens
///
/// Application state exposes it through `FromRef` so the extractor and the
/// layer can find it.
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::from(secret.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Verified identity of the caller, valid for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: i64,

    /// Authenticated username
    pub username: String,

    /// Role carried by the token
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: i64, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Builds the context from verified claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner filter for tenant-scoped queries
    ///
    /// `None` means unscoped (admin sees and acts on every tenant's rows),
    /// `Some(user_id)` restricts statements to the caller's own rows.
    pub fn owner_scope(&self) -> Option<i64> {
        if self.is_admin() {
            None
        } else {
            Some(self.user_id)
        }
    }
}

/// Authentication failure, always answered with 401
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header at all
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header format")]
    InvalidFormat,

    /// Bad signature, expired, wrong issuer or malformed payload. The cause
    /// is deliberately not part of the message.
    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        tracing::debug!(error = %err, "Rejected bearer token");
        AuthError::InvalidToken
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Exactly two whitespace-separated parts are accepted, the first being the
/// literal scheme `Bearer`.
pub fn parse_bearer(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::InvalidFormat),
    }
}

/// Runs the full verification for a set of request headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = parse_bearer(header_value)?;
    let claims = validate_token(token, secret)?;

    Ok(AuthContext::from_claims(claims))
}

/// JWT authentication layer
///
/// Use with `axum::middleware::from_fn_with_state`. On success the
/// [`AuthContext`] is inserted into the request extensions.
///
/// # Errors
///
/// Returns 401 if the header is missing or malformed, or the token does not
/// verify.
pub async fn jwt_auth_middleware(
    State(secret): State<JwtSecret>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), secret.as_str())?;

    tracing::debug!(user_id = auth_context.user_id, "Authenticated request");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<AuthContext>() {
            return Ok(existing.clone());
        }

        let secret = JwtSecret::from_ref(state);
        let auth_context = authenticate(&parts.headers, secret.as_str())?;
        parts.extensions.insert(auth_context.clone());

        Ok(auth_context)
    }
}
