//! Application configuration module
//!
//! Provides the configuration types shared by the lock server and the client
//! agent. Nothing here reads the environment; loading lives next to the
//! binary that needs it (`backend::server::config`, `client::config`).

use std::time::Duration;
use thiserror::Error;

/// Default lease granted to a lock holder
pub const DEFAULT_LEASE: Duration = Duration::from_secs(300);

/// Default number of read-decide-write rounds before giving up on a key
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 8;

/// Default mount point of the lock endpoint
pub const DEFAULT_ROUTE_PREFIX: &str = "/api/locks";

/// Default per-request timeout used by the client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lock service settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// Lease granted on acquire and on every refresh
    pub lease: Duration,
    /// Compare-and-swap rounds per operation
    pub max_write_attempts: u32,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            lease: DEFAULT_LEASE,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl LockSettings {
    pub fn with_lease(lease: Duration) -> Self {
        Self {
            lease,
            ..Self::default()
        }
    }

    /// Lease as a chrono duration for timestamp arithmetic
    pub fn lease_delta(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.lease.as_millis().min(i64::MAX as u128) as i64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lease.is_zero() {
            return Err(ConfigError::InvalidValue("lease", "must be greater than zero".into()));
        }
        // Keep timestamp arithmetic far from chrono's range limits.
        if self.lease > Duration::from_secs(60 * 60 * 24 * 365) {
            return Err(ConfigError::InvalidValue("lease", "must be at most one year".into()));
        }
        if self.max_write_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "max_write_attempts",
                "must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Lock server base URL (client side)
    pub server_url: Option<String>,
    /// Path the lock endpoint is mounted under
    pub route_prefix: String,
    /// Lock service settings (server side)
    pub lock: LockSettings,
    /// Per-request timeout (client side)
    pub request_timeout: Duration,
    /// Heartbeat period for held locks (client side)
    pub heartbeat_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            lock: LockSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            heartbeat_interval: DEFAULT_LEASE / 2,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if !self.route_prefix.starts_with('/') || self.route_prefix.ends_with('/') {
            return Err(ConfigError::InvalidValue(
                "route_prefix",
                format!("'{}' must start with '/' and not end with '/'", self.route_prefix),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("request_timeout", "must be greater than zero".into()));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "heartbeat_interval",
                "must be greater than zero".into(),
            ));
        }
        self.lock.validate()
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    route_prefix: Option<String>,
    lease: Option<Duration>,
    max_write_attempts: Option<u32>,
    request_timeout: Option<Duration>,
    heartbeat_interval: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(prefix.into());
        self
    }

    pub fn lease(mut self, lease: Duration) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = Some(attempts);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Build and validate the configuration
    ///
    /// Without an explicit heartbeat interval the heartbeat runs at half the
    /// configured lease.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let lock = LockSettings {
            lease: self.lease.unwrap_or(defaults.lock.lease),
            max_write_attempts: self
                .max_write_attempts
                .unwrap_or(defaults.lock.max_write_attempts),
        };
        let config = AppConfig {
            server_url: self.server_url,
            route_prefix: self.route_prefix.unwrap_or(defaults.route_prefix),
            lock,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            heartbeat_interval: self.heartbeat_interval.unwrap_or(lock.lease / 2),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
