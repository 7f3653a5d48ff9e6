/// Domain endpoints
///
/// - `GET /api/v1/domains` - Own domains (all domains for admins)
/// - `POST /api/v1/domains` - Add a domain owned by the caller
/// - `GET /api/v1/domains/:id` - One domain (owner or admin)
/// - `DELETE /api/v1/domains/:id` - Remove a domain (owner or admin)
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::{
    auth::{authorization::enforce_ownership, middleware::AuthContext},
    models::{
        activity_log::NewActivity,
        domain::{CreateDomain, Domain},
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
pub struct CreateDomainRequest {
    #[validate(length(max = 253, message = "Domain name is too long"))]
    pub name: String,

    /// Defaults to `/home/<username>/public_html/<name>`
    #[serde(default)]
    pub document_root: Option<String>,
}

pub async fn list_domains(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<Vec<Domain>>> {
    let domains = Domain::list(&state.db, auth.owner_scope()).await?;
    Ok(ApiResponse::ok(domains))
}

/// Creates a domain owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: Missing name, or the name is already registered
pub async fn create_domain(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<CreateDomainRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let req = body.validated()?;
    let name = required(&req.name, "Domain name is required")?.to_ascii_lowercase();

    let document_root = req
        .document_root
        .map(|root| root.trim().to_string())
        .filter(|root| !root.is_empty())
        .unwrap_or_else(|| Domain::default_document_root(&auth.username, &name));

    let domain = Domain::create(
        &state.db,
        CreateDomain {
            user_id: auth.user_id,
            name,
            document_root,
        },
    )
    .await
    .map_err(ApiError::store("Domain"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "domain.create").details(domain.name.clone()),
    )
    .await;
    tracing::info!(user_id = auth.user_id, domain_id = domain.id, name = %domain.name, "Domain created");

    Ok(ApiResponse::created(Created { id: domain.id }).with_message("Domain created successfully"))
}

pub async fn get_domain(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Domain>> {
    enforce_ownership::<Domain>(&state.db, &auth, id).await?;

    let domain = Domain::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Domain not found".to_string()))?;

    Ok(ApiResponse::ok(domain))
}

/// Deletes a domain after the ownership gate
///
/// The delete itself is scoped to the caller as well, so a row that changed
/// hands after the check is reported as missing.
pub async fn delete_domain(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    enforce_ownership::<Domain>(&state.db, &auth, id).await?;

    if !Domain::delete(&state.db, id, auth.owner_scope()).await? {
        return Err(ApiError::NotFound("Domain not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "domain.delete").details(format!("id={}", id)),
    )
    .await;
    tracing::info!(user_id = auth.user_id, domain_id = id, "Domain deleted");

    Ok(ApiResponse::message("Domain deleted successfully"))
}
