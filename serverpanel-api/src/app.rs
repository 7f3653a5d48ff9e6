/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use serverpanel_api::{app::AppState, config::Config};
/// use serverpanel_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let state = AppState::new(pool, config);
/// let app = serverpanel_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use serverpanel_shared::auth::{
    authorization::{role_gate, ADMIN_ONLY},
    middleware::{jwt_auth_middleware, JwtSecret},
};
use sqlx::SqlitePool;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    jwt_secret: JwtSecret,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let jwt_secret = JwtSecret::new(config.jwt.secret.clone());
        Self {
            db,
            config: Arc::new(config),
            jwt_secret,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_str()
    }

    /// Lifetime of newly issued access tokens
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.jwt.expiration_hours)
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api/v1
/// ├── GET    /health                      public
/// ├── POST   /auth/login                  public
/// │
/// ├── (bearer token)
/// │   ├── GET    /auth/me
/// │   ├── POST   /auth/logout
/// │   ├── GET    /dashboard/stats
/// │   ├── GET    /domains, POST /domains
/// │   ├── GET    /domains/:id, DELETE /domains/:id        ownership
/// │   ├── GET    /databases, POST /databases
/// │   ├── DELETE /databases/:id                           ownership
/// │   ├── GET    /databases/:id/users, POST ...           ownership
/// │   ├── DELETE /database-users/:id                      ownership
/// │   ├── GET    /email-accounts, POST /email-accounts
/// │   ├── DELETE /email-accounts/:id                      ownership
/// │   └── GET    /accounts/:id                            ownership
/// │
/// └── (bearer token + admin role)
///     ├── /accounts, DELETE /accounts/:id, /accounts/:id/{suspend,unsuspend}
///     ├── /users, /users/:id, /users/:id/package
///     ├── /packages, /packages/:id
///     └── GET /activity
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Token verification (protected groups only)
/// 4. Role gate (admin group only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{
        accounts, activity, auth, dashboard, databases, domains, email_accounts, health,
        packages, users,
    };

    let jwt_layer =
        middleware::from_fn_with_state(state.jwt_secret.clone(), jwt_auth_middleware);
    let admin_gate = middleware::from_fn(role_gate(ADMIN_ONLY));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login));

    let tenant_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard/stats", get(dashboard::stats))
        .route(
            "/domains",
            get(domains::list_domains).post(domains::create_domain),
        )
        .route(
            "/domains/:id",
            get(domains::get_domain).delete(domains::delete_domain),
        )
        .route(
            "/databases",
            get(databases::list_databases).post(databases::create_database),
        )
        .route("/databases/:id", delete(databases::delete_database))
        .route(
            "/databases/:id/users",
            get(databases::list_database_users).post(databases::create_database_user),
        )
        .route(
            "/database-users/:id",
            delete(databases::delete_database_user),
        )
        .route(
            "/email-accounts",
            get(email_accounts::list_email_accounts).post(email_accounts::create_email_account),
        )
        .route(
            "/email-accounts/:id",
            delete(email_accounts::delete_email_account),
        )
        // An account may read itself; removing one is an admin action
        .route(
            "/accounts/:id",
            get(accounts::get_account)
                .merge(delete(accounts::delete_account).route_layer(admin_gate.clone())),
        );

    let admin_routes = Router::new()
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts/:id/suspend", post(accounts::suspend_account))
        .route("/accounts/:id/unsuspend", post(accounts::unsuspend_account))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:id/package",
            put(users::assign_package).delete(users::unassign_package),
        )
        .route(
            "/packages",
            get(packages::list_packages).post(packages::create_package),
        )
        .route(
            "/packages/:id",
            put(packages::update_package).delete(packages::delete_package),
        )
        .route("/activity", get(activity::list_activity))
        .route_layer(admin_gate);

    // route_layer keeps unknown paths at 404 instead of 401
    let protected_routes = tenant_routes.merge(admin_routes).route_layer(jwt_layer);

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.allows_any_origin() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
