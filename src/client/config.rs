use std::time::Duration;

use reqwest::Url;

use crate::client::error::ClientError;
use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Client configuration wrapper.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    app: AppConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app: AppConfig {
                server_url: Some(DEFAULT_SERVER_URL.to_string()),
                ..AppConfig::default()
            },
        }
    }
}

impl ClientConfig {
    /// Read `CLIENT_API_URL`, `CLIENT_REQUEST_TIMEOUT_SECONDS` and
    /// `CLIENT_HEARTBEAT_SECONDS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = AppConfig::builder()
            .server_url(env("CLIENT_API_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()));

        if let Some(raw) = env("CLIENT_REQUEST_TIMEOUT_SECONDS") {
            builder = builder.request_timeout(seconds("CLIENT_REQUEST_TIMEOUT_SECONDS", &raw)?);
        }
        if let Some(raw) = env("CLIENT_HEARTBEAT_SECONDS") {
            builder = builder.heartbeat_interval(seconds("CLIENT_HEARTBEAT_SECONDS", &raw)?);
        }
        if let Some(prefix) = env("LOCK_ROUTE_PREFIX") {
            builder = builder.route_prefix(prefix);
        }

        Self::with_builder(builder)
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self { app: builder.build()? })
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        self.app.request_timeout
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.app.heartbeat_interval
    }

    /// URL of the lock endpoint for `resource_id`
    ///
    /// The resource id is percent-encoded as a single path segment.
    pub fn lock_url(&self, resource_id: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(self.server_url())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.server_url(), e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.server_url().to_string()))?;
            segments.pop_if_empty();
            for part in self.app.route_prefix.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
            segments.push(resource_id);
        }
        Ok(url)
    }
}

fn seconds(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidValue(key, format!("'{}' is not a number of seconds", raw)))
}
