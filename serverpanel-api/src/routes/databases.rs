/// Database and database user endpoints
///
/// - `GET /api/v1/databases`, `POST /api/v1/databases`
/// - `DELETE /api/v1/databases/:id`
/// - `GET /api/v1/databases/:id/users`, `POST /api/v1/databases/:id/users`
/// - `DELETE /api/v1/database-users/:id`
///
/// A database user belongs to whoever owns its database, even when an admin
/// creates it.
use axum::extract::State;
use serde::Deserialize;
use serverpanel_shared::{
    auth::{
        authorization::enforce_ownership,
        middleware::AuthContext,
        password::hash_password,
    },
    models::{
        activity_log::NewActivity,
        database::{CreateDatabase, Database, DEFAULT_DB_TYPE},
        database_user::{CreateDatabaseUser, DatabaseUser, DEFAULT_HOST},
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
pub struct CreateDatabaseRequest {
    #[validate(length(max = 64, message = "Database name is too long"))]
    pub name: String,

    /// Engine, `mysql` unless given
    #[serde(default, rename = "type")]
    pub db_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDatabaseUserRequest {
    #[validate(length(max = 32, message = "Username is too long"))]
    pub username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub host: Option<String>,
}

pub async fn list_databases(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<Vec<Database>>> {
    let databases = Database::list(&state.db, auth.owner_scope()).await?;
    Ok(ApiResponse::ok(databases))
}

pub async fn create_database(
    State(state): State<AppState>,
    auth: AuthContext,
    body: ApiJson<CreateDatabaseRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let req = body.validated()?;
    let name = required(&req.name, "Database name is required")?;
    let db_type = req
        .db_type
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_DB_TYPE.to_string());

    let database = Database::create(
        &state.db,
        CreateDatabase {
            user_id: auth.user_id,
            name,
            db_type,
        },
    )
    .await
    .map_err(ApiError::store("Database"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "database.create").details(database.name.clone()),
    )
    .await;
    tracing::info!(user_id = auth.user_id, database_id = database.id, "Database created");

    Ok(ApiResponse::created(Created { id: database.id })
        .with_message("Database created successfully"))
}

pub async fn delete_database(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    enforce_ownership::<Database>(&state.db, &auth, id).await?;

    if !Database::delete(&state.db, id, auth.owner_scope()).await? {
        return Err(ApiError::NotFound("Database not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "database.delete").details(format!("id={}", id)),
    )
    .await;
    tracing::info!(user_id = auth.user_id, database_id = id, "Database deleted");

    Ok(ApiResponse::message("Database deleted successfully"))
}

pub async fn list_database_users(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(database_id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Vec<DatabaseUser>>> {
    enforce_ownership::<Database>(&state.db, &auth, database_id).await?;

    let users = DatabaseUser::list_by_database(&state.db, database_id).await?;
    Ok(ApiResponse::ok(users))
}

/// Adds a login to a database the caller may manage
///
/// # Errors
///
/// - `400 Bad Request`: Missing username, short password, taken username
/// - `403 Forbidden`: Database belongs to someone else
/// - `404 Not Found`: No such database
pub async fn create_database_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(database_id): ApiPath<i64>,
    body: ApiJson<CreateDatabaseUserRequest>,
) -> ApiResult<ApiResponse<Created>> {
    let owner_id = enforce_ownership::<Database>(&state.db, &auth, database_id).await?;

    let req = body.validated()?;
    let db_username = required(&req.username, "Username is required")?;
    let host = req
        .host
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let db_user = DatabaseUser::create(
        &state.db,
        CreateDatabaseUser {
            user_id: owner_id,
            database_id,
            db_username,
            password_hash: hash_password(&req.password)?,
            host,
        },
    )
    .await
    .map_err(ApiError::store("Database user"))?;

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "database_user.create")
            .details(format!("{}@{}", db_user.db_username, db_user.host)),
    )
    .await;
    tracing::info!(
        user_id = auth.user_id,
        database_id,
        database_user_id = db_user.id,
        "Database user created"
    );

    Ok(ApiResponse::created(Created { id: db_user.id })
        .with_message("Database user created successfully"))
}

pub async fn delete_database_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    enforce_ownership::<DatabaseUser>(&state.db, &auth, id).await?;

    if !DatabaseUser::delete(&state.db, id, auth.owner_scope()).await? {
        return Err(ApiError::NotFound("Database user not found".to_string()));
    }

    record_activity(
        &state.db,
        NewActivity::new(auth.user_id, "database_user.delete").details(format!("id={}", id)),
    )
    .await;

    Ok(ApiResponse::message("Database user deleted successfully"))
}
