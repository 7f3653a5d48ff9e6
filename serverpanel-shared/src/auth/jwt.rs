//! JWT token issuing and verification
//!
//! Access tokens are signed with HS256 using the shared panel secret and carry
//! the identity the rest of the request relies on: user id, username and role.
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256), no other algorithm is accepted
//! - **Expiration**: Configurable, checked with zero leeway
//! - **Issuer**: Always `serverpanel`
//! - **Revocation**: None. A token stays valid until `exp` even if the user is
//!   suspended or deleted afterwards. This is an accepted limitation of the
//!   stateless design; keep expirations short.
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use serverpanel_shared::auth::jwt::{create_token, validate_token, Claims};
//! use serverpanel_shared::models::user::Role;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "an-example-secret-that-is-32-bytes!";
//! let claims = Claims::for_identity(7, "alice", Role::User, Duration::hours(1));
//! let token = create_token(&claims, secret)?;
//!
//! let verified = validate_token(&token, secret)?;
//! assert_eq!(verified.user_id, 7);
//! assert_eq!(verified.username, "alice");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::{Role, User};

/// Issuer written into and required from every token
pub const ISSUER: &str = "serverpanel";

/// Default access token lifetime
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer or payload did not check out
    #[error("Failed to validate token: {0}")]
    ValidationError(String),
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `iss`: Issuer (always "serverpanel")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Identity Claims
///
/// - `user_id`: Id of the authenticated user
/// - `username`: Login name, used to derive per-user paths
/// - `role`: Role at the time the token was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub user_id: i64,

    /// Authenticated username
    pub username: String,

    /// Role of the user when the token was issued
    pub role: Role,

    /// Issuer - always "serverpanel"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a stored user
    pub fn new(user: &User, expires_in: Duration) -> Self {
        Self::for_identity(user.id, user.username.clone(), user.role, expires_in)
    }

    /// Creates claims from raw identity fields
    ///
    /// A negative `expires_in` produces claims that are already expired,
    /// which is mostly useful in tests.
    pub fn for_identity(
        user_id: i64,
        username: impl Into<String>,
        role: Role,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;
        // nbf must not be after exp, otherwise an expired token would be
        // reported as "not yet valid"
        let not_before = now.min(expiration);

        Self {
            user_id,
            username: username.into(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: not_before.timestamp(),
        }
    }
}

/// Signs claims into a compact JWT using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies a token and extracts its claims
///
/// Checks, in order: structure, HS256 signature against `secret`, issuer,
/// `exp` and `nbf` against the current time. No leeway is granted.
///
/// # Errors
///
/// - `JwtError::Expired` when the signature is valid but `exp` has passed
/// - `JwtError::ValidationError` for anything else
///
/// Callers facing clients must not forward the distinction; see
/// [`crate::auth::middleware::AuthError::InvalidToken`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
