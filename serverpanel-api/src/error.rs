//! Error handling for the API server
//!
//! Handlers return `ApiResult<T>`; every failure becomes an [`ApiError`] and
//! is rendered in the common envelope `{ "success": false, "error": ... }`.
//!
//! | Variant           | Status |
//! |-------------------|--------|
//! | `BadRequest`      | 400    |
//! | `ValidationError` | 400    |
//! | `Unauthorized`    | 401    |
//! | `Forbidden`       | 403    |
//! | `NotFound`        | 404    |
//! | `InternalError`   | 500    |
//!
//! Internal errors are logged and replaced with a generic message.
//!
//! # Example
//!
//! ```
//! use serverpanel_api::error::{ApiError, ApiResult};
//!
//! fn parse_quota(raw: &str) -> ApiResult<i64> {
//!     raw.parse()
//!         .map_err(|_| ApiError::BadRequest("Quota must be a number".to_string()))
//! }
//!
//! assert!(parse_quota("100").is_ok());
//! assert!(parse_quota("lots").is_err());
//! ```

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serverpanel_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
};
use sqlx::error::ErrorKind;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): malformed input, malformed id, integrity violation
    BadRequest(String),

    /// Request body failed field validation (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500); the message is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a store error from a create or update of `resource`
    ///
    /// A uniqueness violation becomes 400 "<resource> already exists";
    /// everything else goes through the generic `From<sqlx::Error>`.
    pub fn from_store(resource: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.kind(), ErrorKind::UniqueViolation) {
                return ApiError::BadRequest(format!("{} already exists", resource));
            }
        }
        ApiError::from(err)
    }

    /// Closure form of [`ApiError::from_store`] for `map_err`
    pub fn store(resource: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |err| Self::from_store(resource, err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, details) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            ApiError::ValidationError(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    ApiError::BadRequest("Resource already exists".to_string())
                }
                ErrorKind::ForeignKeyViolation => ApiError::BadRequest(
                    "Referenced resource is missing or still in use".to_string(),
                ),
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    ApiError::BadRequest("Invalid field value".to_string())
                }
                _ => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        let message = err.to_string();
        match err {
            AuthzError::InsufficientRole { .. } | AuthzError::Forbidden => {
                ApiError::Forbidden(message)
            }
            AuthzError::NotFound(_) => ApiError::NotFound(message),
            AuthzError::DatabaseError(e) => {
                ApiError::InternalError(format!("Ownership lookup failed: {}", e))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            other => {
                tracing::debug!(error = %other, "Token rejected");
                ApiError::Unauthorized(AuthError::InvalidToken.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest("Invalid request body".to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
        ApiError::BadRequest("Invalid ID".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Domain not found".to_string());
        assert_eq!(err.to_string(), "Not found: Domain not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest(String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ValidationError(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound(String::new()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InternalError(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_authz_errors_keep_their_status() {
        assert!(matches!(
            ApiError::from(AuthzError::NotFound("Domain")),
            ApiError::NotFound(msg) if msg == "Domain not found"
        ));
        assert!(matches!(
            ApiError::from(AuthzError::Forbidden),
            ApiError::Forbidden(msg) if msg == "Permission denied"
        ));
    }

    #[test]
    fn test_jwt_failures_share_one_message() {
        let expired = ApiError::from(JwtError::Expired);
        let forged = ApiError::from(JwtError::ValidationError("bad signature".to_string()));

        assert_eq!(expired.to_string(), forged.to_string());
        assert!(matches!(
            ApiError::from(JwtError::CreateError("boom".to_string())),
            ApiError::InternalError(_)
        ));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("disk on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Internal server error");
    }
}
