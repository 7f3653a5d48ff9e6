/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/login` - Exchange credentials for an access token
/// - `GET /api/v1/auth/me` - Current user
/// - `POST /api/v1/auth/logout` - Acknowledge logout
///
/// Tokens are stateless; logging out means the client discards its token.
use axum::{extract::State, http::HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serverpanel_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{activity_log::NewActivity, user::User},
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::ApiResponse,
    routes::{client_ip, record_activity},
};

/// Every credential failure gets the same answer
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// HS256 access token
    pub token: String,

    pub expires_at: DateTime<Utc>,

    pub user: User,
}

/// Login endpoint
///
/// # Request
///
/// ```text
/// POST /api/v1/auth/login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields
/// - `401 Unauthorized`: Unknown user, wrong password or suspended account
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let req = body.validated()?;

    let Some(user) = User::find_by_username(&state.db, req.username.trim()).await? else {
        // Same Argon2 cost as a wrong password
        password::verify_dummy(&req.password);
        tracing::info!("Login rejected: unknown user");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.active {
        tracing::info!(user_id = user.id, "Login rejected: account suspended");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let claims = jwt::Claims::new(&user, state.token_ttl());
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| ApiError::InternalError("Token expiry out of range".to_string()))?;

    record_activity(
        &state.db,
        NewActivity::new(user.id, "user.login").ip_address(client_ip(&headers)),
    )
    .await;
    tracing::info!(user_id = user.id, role = user.role.as_str(), "User logged in");

    Ok(ApiResponse::ok(LoginResponse {
        token,
        expires_at,
        user,
    }))
}

/// Current user
///
/// 404 if the account was deleted after the token was issued.
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<ApiResponse<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(user))
}

pub async fn logout(auth: AuthContext) -> ApiResponse<()> {
    tracing::debug!(user_id = auth.user_id, "Logout");
    ApiResponse::message("Logged out")
}
