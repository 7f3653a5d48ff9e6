//! Authentication and authorization
//!
//! Every protected request crosses exactly one trust boundary: the token
//! verifier. Everything downstream reads the identity it produced.
//!
//! # Modules
//!
//! - [`jwt`]: HS256 token issuing and verification
//! - [`password`]: Argon2id password hashing
//! - [`middleware`]: Bearer parsing, the per-request [`middleware::AuthContext`]
//!   and the axum layer/extractor that attach it
//! - [`authorization`]: Role gate and ownership gate
//!
//! # Request flow
//!
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//! jwt::validate_token ──► AuthContext { user_id, username, role }
//!        │
//!        ▼
//! role gate (admin-only route groups)
//!        │
//!        ▼
//! handler ──► enforce_ownership::<R>(pool, &auth, id) ──► mutation
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
