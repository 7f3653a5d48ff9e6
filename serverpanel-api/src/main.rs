//! # ServerPanel API Server
//!
//! Control plane for the ServerPanel hosting panel: authentication, tenant
//! resources (domains, databases, mailboxes) and admin management of users,
//! hosting accounts and packages.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment
//! 2. Open the SQLite pool and apply embedded migrations
//! 3. Bootstrap the initial admin and default packages
//! 4. Serve until Ctrl-C, then drain and close the pool
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) ADMIN_PASSWORD=changeme123 \
//!     cargo run -p serverpanel-api
//! ```

use serverpanel_api::{
    app::{build_router, AppState},
    config::Config,
};
use serverpanel_shared::{
    bootstrap::{self, AdminSeed},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serverpanel_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "ServerPanel API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let report = bootstrap::run(
        &pool,
        &AdminSeed {
            username: config.bootstrap.admin_username.clone(),
            email: config.bootstrap.admin_email.clone(),
            password: config.bootstrap.admin_password.clone(),
        },
        config.bootstrap.seed_default_packages,
    )
    .await?;
    tracing::info!(
        admin_created = report.admin_created,
        packages_seeded = report.packages_seeded,
        "Bootstrap complete"
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
