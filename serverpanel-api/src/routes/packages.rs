/// Hosting package endpoints (admin only)
///
/// - `GET /api/v1/packages`
/// - `POST /api/v1/packages`
/// - `PUT /api/v1/packages/:id`
/// - `DELETE /api/v1/packages/:id`
///
/// Quotas are in MB (disk, bandwidth) or counts; all must be non-negative.
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::{
    auth::middleware::AuthContext,
    models::{
        activity_log::NewActivity,
        package::{Package, PackageInput},
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

/// Body for both create and update
#[derive(Debug, Deserialize, Validate)]
pub struct PackageRequest {
    #[validate(length(max = 64, message = "Package name is too long"))]
    pub name: String,

    #[validate(range(min = 0, message = "Quota must not be negative"))]
    pub disk_quota: i64,

    #[validate(range(min = 0, message = "Quota must not be negative"))]
    pub bandwidth_quota: i64,

    #[validate(range(min = 0, message = "Limit must not be negative"))]
    pub max_domains: i64,

    #[validate(range(min = 0, message = "Limit must not be negative"))]
    pub max_databases: i64,

    #[validate(range(min = 0, message = "Limit must not be negative"))]
    pub max_emails: i64,

    #[validate(range(min = 0, message = "Limit must not be negative"))]
    pub max_ftp: i64,
}

impl PackageRequest {
    fn into_input(self) -> ApiResult<PackageInput> {
        Ok(PackageInput {
            name: required(&self.name, "Package name is required")?,
            disk_quota: self.disk_quota,
            bandwidth_quota: self.bandwidth_quota,
            max_domains: self.max_domains,
            max_databases: self.max_databases,
            max_emails: self.max_emails,
            max_ftp: self.max_ftp,
        })
    }
}

pub async fn list_packages(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Package>>> {
    let packages = Package::list(&state.db).await?;
    Ok(ApiResponse::ok(packages))
}

pub async fn create_package(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<PackageRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let input = body.validated()?.into_input()?;

    let package = Package::create(&state.db, input)
        .await
        .map_err(ApiError::store("Package"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "package.create").details(package.name.clone()),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, package_id = package.id, name = %package.name, "Package created");

    Ok(ApiResponse::created(Created { id: package.id })
        .with_message("Package created successfully"))
}

pub async fn update_package(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    body: ApiJson<PackageRequest>,
) -> ApiResult<ApiResponse<Package>> {
    let input = body.validated()?.into_input()?;

    let package = Package::update(&state.db, id, input)
        .await
        .map_err(ApiError::store("Package"))?
        .ok_or_else(|| ApiError::NotFound("Package not found".to_string()))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "package.update").details(package.name.clone()),
    )
    .await;

    Ok(ApiResponse::ok(package).with_message("Package updated successfully"))
}

/// Deletes a package nobody is using
///
/// # Errors
///
/// - `400 Bad Request`: Still assigned to a user
/// - `404 Not Found`: No such package
pub async fn delete_package(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    if Package::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("Package not found".to_string()));
    }

    if Package::is_in_use(&state.db, id).await? {
        return Err(ApiError::BadRequest("Package is in use".to_string()));
    }

    // An assignment made after the check still trips the foreign key
    let deleted = Package::delete(&state.db, id).await.map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ApiError::BadRequest("Package is in use".to_string())
        }
        _ => ApiError::from(err),
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Package not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "package.delete").details(format!("id={}", id)),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, package_id = id, "Package deleted");

    Ok(ApiResponse::message("Package deleted successfully"))
}
