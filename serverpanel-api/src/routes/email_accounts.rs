/// Email account endpoints
///
/// - `GET /api/v1/email-accounts` - Own mailboxes (all for admins)
/// - `POST /api/v1/email-accounts` - Add a mailbox under a domain the caller manages
/// - `DELETE /api/v1/email-accounts/:id`
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::{
    auth::{authorization::enforce_ownership, middleware::AuthContext, password::hash_password},
    models::{
        activity_log::NewActivity,
        domain::Domain,
        email_account::{CreateEmailAccount, EmailAccount, DEFAULT_QUOTA_MB},
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
pub struct CreateEmailAccountRequest {
    pub domain_id: i64,

    #[validate(length(max = 254, message = "Email address is too long"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Mailbox quota in MB
    #[validate(range(min = 0, message = "Quota must not be negative"))]
    #[serde(default)]
    pub quota: Option<i64>,
}

pub async fn list_email_accounts(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<Vec<EmailAccount>>> {
    let accounts = EmailAccount::list(&state.db, auth.owner_scope()).await?;
    Ok(ApiResponse::ok(accounts))
}

/// Creates a mailbox
///
/// The mailbox belongs to the owner of its domain, and its address must be
/// under that domain.
pub async fn create_email_account(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<CreateEmailAccountRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let req = body.validated()?;
    let email = required(&req.email, "Email address is required")?.to_ascii_lowercase();

    let owner_id = enforce_ownership::<Domain>(&state.db, &auth, req.domain_id).await?;
    let domain = Domain::find_by_id(&state.db, req.domain_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Domain not found".to_string()))?;

    if !EmailAccount::belongs_to_domain(&email, &domain.name) {
        return Err(ApiError::BadRequest(format!(
            "Email address must end with @{}",
            domain.name
        )));
    }

    let account = EmailAccount::create(
        &state.db,
        CreateEmailAccount {
            user_id: owner_id,
            domain_id: domain.id,
            email,
            password_hash: hash_password(&req.password)?,
            quota: req.quota.unwrap_or(DEFAULT_QUOTA_MB),
        },
    )
    .await
    .map_err(ApiError::store("Email account"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "email.create").details(account.email.clone()),
    )
    .await;
    tracing::info!(user_id = auth.user_id, email_account_id = account.id, "Email account created");

    Ok(ApiResponse::created(Created { id: account.id })
        .with_message("Email account created successfully"))
}

pub async fn delete_email_account(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    enforce_ownership::<EmailAccount>(&state.db, &auth, id).await?;

    if !EmailAccount::delete(&state.db, id, auth.owner_scope()).await? {
        return Err(ApiError::NotFound("Email account not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "email.delete").details(format!("id={}", id)),
    )
    .await;

    Ok(ApiResponse::message("Email account deleted successfully"))
}
