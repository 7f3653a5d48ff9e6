//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A private in-memory store with the schema applied
//! - Seeded users for every role, with tokens
//! - Request helpers that drive the router with `oneshot`
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use serverpanel_api::{
    app::{build_router, AppState},
    config::Config,
};
use serverpanel_shared::{
    auth::{
        jwt::{create_token, Claims},
        password::hash_password,
    },
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, Role, User},
};
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Password shared by every seeded user
pub const PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,

    pub admin: User,
    pub reseller: User,
    pub alice: User,
    pub bob: User,
}

impl TestContext {
    /// Fresh store and router with one user per role plus a second tenant
    pub async fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        let db = create_pool(DatabaseConfig::in_memory())
            .await
            .expect("in-memory pool");
        run_migrations(&db).await.expect("migrations");

        let password_hash = hash_password(PASSWORD).expect("hash");

        let admin = seed_user(&db, "admin", Role::Admin, &password_hash).await;
        let reseller = seed_user(&db, "reseller", Role::Reseller, &password_hash).await;
        let alice = seed_user(&db, "alice", Role::User, &password_hash).await;
        let bob = seed_user(&db, "bob", Role::User, &password_hash).await;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        TestContext {
            db,
            app,
            config,
            admin,
            reseller,
            alice,
            bob,
        }
    }

    /// Valid one-hour token for `user`
    pub fn token(&self, user: &User) -> String {
        let claims = Claims::new(user, Duration::hours(1));
        create_token(&claims, JWT_SECRET).expect("token")
    }

    pub async fn get(&self, uri: &str, user: &User) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(self.token(user).as_str()), None).await
    }

    pub async fn post(&self, uri: &str, user: &User, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(self.token(user).as_str()), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, user: &User, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(self.token(user).as_str()), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, user: &User) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(self.token(user).as_str()), None)
            .await
    }

    /// Sends a request with a bearer token (if any) and an optional JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.send_raw(method, uri, authorization.as_deref(), body).await
    }

    /// Sends a request with a verbatim `Authorization` header value
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Creates a resource through the API and returns its id
    pub async fn create(&self, uri: &str, user: &User, body: Value) -> i64 {
        let (status, json) = self.post(uri, user, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, json);
        json["data"]["id"].as_i64().expect("created id")
    }
}

async fn seed_user(db: &SqlitePool, username: &str, role: Role, password_hash: &str) -> User {
    User::create(
        db,
        CreateUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: password_hash.to_string(),
            role,
            parent_id: None,
        },
    )
    .await
    .expect("seed user")
}
