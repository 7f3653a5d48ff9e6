//! Extractors whose rejections use the API error envelope
//!
//! Plain `axum::Json` and `axum::extract::Path` reject with text bodies and,
//! for bad JSON, 422. These wrappers turn every rejection into a 400
//! [`ApiError`].

use axum::extract::{FromRequest, FromRequestParts};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, ApiResult};

/// JSON body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; a non-numeric id is "Invalid ID" (400)
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl<T: DeserializeOwned + Validate> ApiJson<T> {
    /// Unwraps the body after running its `validator` rules
    pub fn validated(self) -> ApiResult<T> {
        self.0.validate()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Body1 {
        #[validate(length(min = 1))]
        name: String,
    }

    async fn echo(body: ApiJson<Body1>) -> ApiResult<String> {
        Ok(body.validated()?.name)
    }

    async fn by_id(ApiPath(id): ApiPath<i64>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/items/:id", get(by_id))
    }

    fn json_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_rejections_are_400() {
        for body in ["{not json", "{\"other\": 1}", "{\"name\": \"\"}"] {
            let response = app().oneshot(json_post(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        }

        let response = app().oneshot(json_post("{\"name\": \"ok\"}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_400() {
        let request = Request::builder().uri("/items/abc").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::builder().uri("/items/12").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
