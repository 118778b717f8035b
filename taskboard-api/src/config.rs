/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: `*`)
/// - `PRODUCTION`: Enables HSTS when `true` (default: false)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 bytes)
/// - `JWT_ISSUER`: Token issuer (default: taskboard)
/// - `JWT_ACCESS_TTL_MINUTES`: Access token lifetime (default: 60, max: 525600)
/// - `JWT_REFRESH_TTL_DAYS`: Refresh token lifetime (default: 30, max: 3650)
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for JSON logs (default: text)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;
use std::str::FromStr;

use taskboard_shared::auth::jwt::{JwtError, JwtSettings, DEFAULT_ISSUER, MIN_SECRET_LEN};

/// One year
const MAX_ACCESS_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Ten years
const MAX_REFRESH_TTL_DAYS: i64 = 3650;

fn check_lifetime(
    key: &str,
    value: i64,
    max: i64,
    lifetime: Option<chrono::Duration>,
) -> anyhow::Result<()> {
    if value <= 0 || value > max || lifetime.is_none() {
        anyhow::bail!("{} must be between 1 and {}, got {}", key, max, value);
    }
    Ok(())
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Which store backs the API
    pub storage: StorageBackend,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}' (expected postgres or memory)", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; only required for the postgres backend
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and must be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub issuer: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 bytes
    /// - `DATABASE_URL` is missing while the postgres backend is selected
    /// - A numeric variable does not parse
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

        let api_host = var("API_HOST", "0.0.0.0");
        let api_port = var("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = var("PRODUCTION", "false").eq_ignore_ascii_case("true");

        let storage = var("STORAGE_BACKEND", "postgres").parse::<StorageBackend>()?;

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let access_ttl_minutes = var("JWT_ACCESS_TTL_MINUTES", "60")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("Invalid JWT_ACCESS_TTL_MINUTES: {}", e))?;
        let refresh_ttl_days = var("JWT_REFRESH_TTL_DAYS", "30")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("Invalid JWT_REFRESH_TTL_DAYS: {}", e))?;

        check_lifetime(
            "JWT_ACCESS_TTL_MINUTES",
            access_ttl_minutes,
            MAX_ACCESS_TTL_MINUTES,
            chrono::Duration::try_minutes(access_ttl_minutes),
        )?;
        check_lifetime(
            "JWT_REFRESH_TTL_DAYS",
            refresh_ttl_days,
            MAX_REFRESH_TTL_DAYS,
            chrono::Duration::try_days(refresh_ttl_days),
        )?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            storage,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer: var("JWT_ISSUER", DEFAULT_ISSUER),
                access_ttl_minutes,
                refresh_ttl_days,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Builds the token settings this configuration describes
    pub fn jwt_settings(&self) -> Result<JwtSettings, JwtError> {
        let access = chrono::Duration::try_minutes(self.jwt.access_ttl_minutes)
            .ok_or_else(|| JwtError::CreateError("access token lifetime out of range".to_string()))?;
        let refresh = chrono::Duration::try_days(self.jwt.refresh_ttl_days)
            .ok_or_else(|| JwtError::CreateError("refresh token lifetime out of range".to_string()))?;

        Ok(JwtSettings::new(self.jwt.secret.clone())?
            .with_issuer(self.jwt.issuer.clone())
            .with_lifetimes(access, refresh))
    }
}
