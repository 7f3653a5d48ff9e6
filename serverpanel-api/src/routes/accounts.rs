/// Hosting account endpoints
///
/// A hosting account is a `user`-role login together with its package
/// assignment and primary domain.
///
/// - `GET /api/v1/accounts` (admin)
/// - `POST /api/v1/accounts` (admin)
/// - `GET /api/v1/accounts/:id` (admin, or the account itself)
/// - `DELETE /api/v1/accounts/:id` (admin)
/// - `POST /api/v1/accounts/:id/suspend` (admin)
/// - `POST /api/v1/accounts/:id/unsuspend` (admin)
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::{
    auth::{authorization::enforce_ownership, middleware::AuthContext, password::hash_password},
    models::{
        account::{Account, CreateAccount},
        activity_log::NewActivity,
        package::Package,
    },
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    response::{ApiResponse, Created},
    routes::{record_activity, required},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Primary domain
    #[validate(length(max = 253, message = "Domain name is too long"))]
    pub domain: String,

    pub package_id: i64,
}

pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Account>>> {
    let accounts = Account::list(&state.db).await?;
    Ok(ApiResponse::ok(accounts))
}

/// Provisions a hosting account
///
/// User, package assignment and primary domain are created together or not
/// at all.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid fields, unknown package, taken username,
///   email or domain
pub async fn create_account(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<CreateAccountRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let req = body.validated()?;
    let username = required(&req.username, "Username is required")?;
    let domain = required(&req.domain, "Domain is required")?.to_ascii_lowercase();

    if Package::find_by_id(&state.db, req.package_id).await?.is_none() {
        return Err(ApiError::BadRequest("Package not found".to_string()));
    }

    let account = Account::create(
        &state.db,
        CreateAccount {
            username,
            email: req.email.trim().to_string(),
            password_hash: hash_password(&req.password)?,
            domain,
            package_id: req.package_id,
            parent_id: auth.user_id,
        },
    )
    .await
    .map_err(ApiError::store("Username, email or domain"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "account.create").details(account.username.clone()),
    )
    .await;
    tracing::info!(
        admin_id = auth.user_id,
        account_id = account.id,
        username = %account.username,
        "Hosting account created"
    );

    Ok(ApiResponse::created(Created { id: account.id })
        .with_message("Account created successfully"))
}

pub async fn get_account(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Account>> {
    enforce_ownership::<Account>(&state.db, &auth, id).await?;

    let account = Account::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(ApiResponse::ok(account))
}

/// Removes an account along with everything it owns
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    if !Account::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "account.delete").details(format!("id={}", id)),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, account_id = id, "Hosting account deleted");

    Ok(ApiResponse::message("Account deleted successfully"))
}

pub async fn suspend_account(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    set_active(&state, &auth, id, false).await?;
    Ok(ApiResponse::message("Account suspended"))
}

pub async fn unsuspend_account(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    set_active(&state, &auth, id, true).await?;
    Ok(ApiResponse::message("Account unsuspended"))
}

async fn set_active(state: &AppState, auth: &AuthContext, id: i64, active: bool) -> ApiResult<()> {
    if !Account::set_active(&state.db, id, active).await? {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    let action = if active { "account.unsuspend" } else { "account.suspend" };
    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, action).details(format!("id={}", id)),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, account_id = id, active, "Account status changed");

    Ok(())
}
