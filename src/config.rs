//! Configuration management for Turnstile.

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{Result, TurnstileError};

/// Prefix for environment variable overrides, e.g. `TURNSTILE__RATE_LIMITING__LIMIT`.
pub const ENV_PREFIX: &str = "TURNSTILE";

/// Main configuration for the Turnstile service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnstileConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9090))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum admitted requests per client per window
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_limit() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

impl RateLimitingConfig {
    /// Get the window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl TurnstileConfig {
    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TurnstileConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TurnstileError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// Later sources override earlier ones. Environment variables use the
    /// `TURNSTILE__` prefix with `__` between section and key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&TurnstileConfig::default()).map_err(config_error)?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }

        let config: TurnstileConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the configured limit and window are positive.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limiting.limit == 0 {
            return Err(TurnstileError::Config(
                "rate_limiting.limit must be greater than zero".to_string(),
            ));
        }
        if self.rate_limiting.window_secs == 0 {
            return Err(TurnstileError::Config(
                "rate_limiting.window_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_error(e: ::config::ConfigError) -> TurnstileError {
    TurnstileError::Config(e.to_string())
}
