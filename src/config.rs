/// Configuration management
///
/// Loads the core's configuration surface from environment variables and
/// produces type-safe config structs.
///
/// # Environment Variables
///
/// - `AUTH_SECRET`: token signing secret, required, at least 32 bytes
/// - `AUTH_ALGORITHM`: signing algorithm (default: HS256)
/// - `ACCESS_TOKEN_TTL_SECS`: access token lifetime (default: 1800)
/// - `REFRESH_TOKEN_TTL_SECS`: refresh token lifetime (default: 604800)
/// - `DATABASE_URL`: PostgreSQL connection string, required
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;

use crate::auth::token::{TokenConfig, DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};
use crate::db::pool::DatabaseConfig;

/// Complete configuration for the identity core
#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing and lifetime configuration
    pub token: TokenConfig,

    /// Database configuration for the storage collaborator
    pub database: DatabaseConfig,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, the secret is too
    /// short, or a numeric/algorithm value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (for development)
        dotenvy::dotenv().ok();

        let secret = env::var("AUTH_SECRET")
            .map_err(|_| anyhow::anyhow!("AUTH_SECRET environment variable is required"))?;

        if secret.len() < 32 {
            anyhow::bail!("AUTH_SECRET must be at least 32 characters long");
        }

        let algorithm = match env::var("AUTH_ALGORITHM") {
            Ok(name) => Algorithm::from_str(&name)
                .map_err(|_| anyhow::anyhow!("unsupported AUTH_ALGORITHM: {}", name))?,
            Err(_) => Algorithm::HS256,
        };

        let access_ttl_secs = env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_TTL_SECS.to_string())
            .parse::<i64>()?;

        let refresh_ttl_secs = env::var("REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_TTL_SECS.to_string())
            .parse::<i64>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        Ok(Self {
            token: TokenConfig {
                secret,
                algorithm,
                access_ttl: Duration::seconds(access_ttl_secs),
                refresh_ttl: Duration::seconds(refresh_ttl_secs),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..DatabaseConfig::default()
            },
        })
    }
}
