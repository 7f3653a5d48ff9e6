//! Configuration management for the API server
//!
//! Loaded once at startup from environment variables (a `.env` file is read
//! first if present).
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
//! - `DATABASE_URL`: SQLite URL (default: sqlite://serverpanel.db)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
//! - `JWT_EXPIRATION_HOURS`: Access token lifetime (default: 24)
//! - `ADMIN_USERNAME` / `ADMIN_EMAIL`: Initial admin (default: admin / admin@localhost)
//! - `ADMIN_PASSWORD`: Initial admin password; without it no admin is created
//! - `SEED_DEFAULT_PACKAGES`: Seed Starter/Professional/Business (default: true)
//! - `RUST_LOG`: Log filter (default: serverpanel_api=debug,tower_http=debug)
//!
//! # Example
//!
//! ```no_run
//! use serverpanel_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fmt;

use serverpanel_shared::auth::jwt::DEFAULT_EXPIRATION_HOURS;
use serverpanel_shared::db::pool::DEFAULT_DATABASE_URL;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub bootstrap: BootstrapConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in hours
    pub expiration_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// Startup bootstrap configuration
#[derive(Clone)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub seed_default_packages: bool,
}

impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("seed_default_packages", &self.seed_default_packages)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or too short, or a numeric
    /// or boolean variable doesn't parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let expiration_hours = var("JWT_EXPIRATION_HOURS", &DEFAULT_EXPIRATION_HOURS.to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_EXPIRATION_HOURS is invalid: {}", e))?;

        if expiration_hours <= 0 {
            anyhow::bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let seed_default_packages = parse_bool(&var("SEED_DEFAULT_PACKAGES", "true"))
            .ok_or_else(|| anyhow::anyhow!("SEED_DEFAULT_PACKAGES must be true or false"))?;

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST", "0.0.0.0"),
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
            bootstrap: BootstrapConfig {
                admin_username: var("ADMIN_USERNAME", "admin"),
                admin_email: var("ADMIN_EMAIL", "admin@localhost"),
                admin_password: lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
                seed_default_packages,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
