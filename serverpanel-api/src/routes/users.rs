/// User management endpoints (admin only)
///
/// - `GET /api/v1/users`, `POST /api/v1/users`
/// - `GET /api/v1/users/:id`, `PUT /api/v1/users/:id`, `DELETE /api/v1/users/:id`
/// - `PUT /api/v1/users/:id/package`, `DELETE /api/v1/users/:id/package`
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serverpanel_shared::{
    auth::{middleware::AuthContext, password::hash_password},
    models::{
        activity_log::NewActivity,
        package::Package,
        user::{CreateUser, Role, UpdateUser, User},
        user_package::UserPackage,
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
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// `user` unless given
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    pub role: Option<Role>,

    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AssignPackageRequest {
    pub package_id: i64,
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<User>>> {
    let users = User::list(&state.db).await?;
    Ok(ApiResponse::ok(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<CreateUserRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let req = body.validated()?;
    let username = required(&req.username, "Username is required")?;

    let user = User::create(
        &state.db,
        CreateUser {
            username,
            email: req.email.trim().to_string(),
            password_hash: hash_password(&req.password)?,
            role: req.role,
            parent_id: Some(auth.user_id),
        },
    )
    .await
    .map_err(ApiError::store("Username or email"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "user.create")
            .details(format!("{} ({})", user.username, user.role.as_str())),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, user_id = user.id, role = user.role.as_str(), "User created");

    Ok(ApiResponse::created(Created { id: user.id }).with_message("User created successfully"))
}

/// A user together with its package assignment, if any
#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,

    pub package: Option<UserPackage>,
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<UserDetail>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let package = UserPackage::find_by_user(&state.db, id).await?;

    Ok(ApiResponse::ok(UserDetail { user, package }))
}

/// Partial update; absent fields keep their value
///
/// An admin cannot demote or suspend its own account.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    body: ApiJson<UpdateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    let req = body.validated()?;

    if id == auth.user_id {
        if req.role.is_some_and(|role| role != auth.role) {
            return Err(ApiError::BadRequest(
                "Cannot change your own role".to_string(),
            ));
        }
        if req.active == Some(false) {
            return Err(ApiError::BadRequest(
                "Cannot suspend your own account".to_string(),
            ));
        }
    }

    let password_hash = match req.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email.map(|e| e.trim().to_string()),
            password_hash,
            role: req.role,
            active: req.active,
        },
    )
    .await
    .map_err(ApiError::store("Email"))?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "user.update").details(user.username.clone()),
    )
    .await;

    Ok(ApiResponse::ok(user).with_message("User updated successfully"))
}

/// Deletes a user and, by cascade, everything the user owns
///
/// An admin cannot delete its own account.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "user.delete").details(format!("id={}", id)),
    )
    .await;
    tracing::info!(admin_id = auth.user_id, user_id = id, "User deleted");

    Ok(ApiResponse::message("User deleted successfully"))
}

/// Assigns a package, replacing any earlier assignment
pub async fn assign_package(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AssignPackageRequest>,
) -> ApiResult<ApiResponse<UserPackage>> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    if Package::find_by_id(&state.db, req.package_id).await?.is_none() {
        return Err(ApiError::BadRequest("Package not found".to_string()));
    }

    let assignment = UserPackage::assign(&state.db, id, req.package_id).await?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "package.assign")
            .details(format!("user={} package={}", id, req.package_id)),
    )
    .await;

    Ok(ApiResponse::ok(assignment).with_message("Package assigned"))
}

pub async fn unassign_package(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    if !UserPackage::unassign(&state.db, id).await? {
        return Err(ApiError::NotFound("No package assigned".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "package.unassign").details(format!("user={}", id)),
    )
    .await;

    Ok(ApiResponse::message("Package unassigned"))
}
