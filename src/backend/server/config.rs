/**
 * Server Configuration
 *
 * This module handles loading of server configuration and the optional
 * PostgreSQL database connection.
 *
 * # Configuration Sources
 *
 * Later sources override earlier ones:
 *
 * 1. Built-in defaults (`AppConfig::default`)
 * 2. TOML file named by `XFLOCK_CONFIG`, if set
 * 3. Environment: `LOCK_LEASE_SECONDS`, `LOCK_MAX_WRITE_ATTEMPTS`,
 *    `LOCK_ROUTE_PREFIX`
 *
 * ```toml
 * lease_seconds = 300
 * max_write_attempts = 8
 * route_prefix = "/api/locks"
 * ```
 *
 * # Error Handling
 *
 * An invalid lock configuration is an error: the server refuses to start
 * rather than run with a lease nobody asked for. So is a `DATABASE_URL`
 * that cannot be reached: other processes may share that database, and a
 * private in-memory store would grant locks they cannot see. Only an unset
 * `DATABASE_URL` selects the in-memory store.
 */

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use sqlx::PgPool;

use crate::shared::{AppConfig, ConfigError};

/// Environment variable naming the TOML configuration file
pub const CONFIG_PATH_ENV: &str = "XFLOCK_CONFIG";

/// Default listening port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Reasons the server refuses to start
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Database at DATABASE_URL is unreachable: {0}")]
    DatabaseUnreachable(#[source] sqlx::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Contents of the TOML configuration file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub lease_seconds: Option<u64>,
    pub max_write_attempts: Option<u32>,
    pub route_prefix: Option<String>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }
}

/// Load the server configuration from the file and the process environment
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let file = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            ConfigFile::read(Path::new(&path))?
        }
        Err(_) => ConfigFile::default(),
    };

    build_config(file, |key| std::env::var(key).ok())
}

/// Merge file values and environment overrides into a validated config
pub fn build_config(
    file: ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = AppConfig::builder();

    let lease_seconds = match env("LOCK_LEASE_SECONDS") {
        Some(raw) => Some(parse_number::<u64>("LOCK_LEASE_SECONDS", &raw)?),
        None => file.lease_seconds,
    };
    if let Some(seconds) = lease_seconds {
        builder = builder.lease(Duration::from_secs(seconds));
    }

    let attempts = match env("LOCK_MAX_WRITE_ATTEMPTS") {
        Some(raw) => Some(parse_number::<u32>("LOCK_MAX_WRITE_ATTEMPTS", &raw)?),
        None => file.max_write_attempts,
    };
    if let Some(attempts) = attempts {
        builder = builder.max_write_attempts(attempts);
    }

    if let Some(prefix) = env("LOCK_ROUTE_PREFIX").or(file.route_prefix) {
        builder = builder.route_prefix(prefix);
    }

    builder.build()
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key, format!("'{}' is not a valid number", raw)))
}

/// Port to listen on, from `SERVER_PORT`
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// Load and initialize database connection pool
///
/// This function:
/// 1. Reads `DATABASE_URL` from environment
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - `Ok(Some(PgPool))` if the database is connected
/// - `Ok(None)` if `DATABASE_URL` is not set
/// - `Err` if `DATABASE_URL` is set but the connection fails
pub async fn load_database() -> Result<DatabaseConfig, StartupError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => connect_database(&url).await.map(Some),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Lock records will be kept in memory.");
            Ok(None)
        }
    }
}

/// Connect to `database_url` and run migrations
pub async fn connect_database(database_url: &str) -> Result<PgPool, StartupError> {
    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            return Err(StartupError::DatabaseUnreachable(e));
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {:?}", e);
            // Continue anyway - migrations might have already been run
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Ok(pool)
}
