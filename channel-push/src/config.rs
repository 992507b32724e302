//! Configuration for the push API client

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::DEFAULT_HOST;
use crate::{PushError, PushResult};

/// Environment variable holding the access key
pub const ENV_ACCESS_KEY: &str = "BAE_ENV_AK";
/// Environment variable holding the secret key
pub const ENV_SECRET_KEY: &str = "BAE_ENV_SK";
/// Environment variable overriding the API host
pub const ENV_HOST: &str = "BAE_ENV_ADDR_CHANNEL";

/// API credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Access key, sent as `apikey`
    pub access_key: String,
    /// Secret key, only ever used as signature input
    pub secret_key: SecretString,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: SecretString::new(secret_key.into()),
        }
    }

    /// Load credentials from `BAE_ENV_AK` and `BAE_ENV_SK`
    pub fn from_env() -> PushResult<Self> {
        let access_key = read_env(ENV_ACCESS_KEY)?;
        let secret_key = read_env(ENV_SECRET_KEY)?;
        Ok(Self::new(access_key, secret_key))
    }

    /// Check that neither key is empty
    pub fn validate(&self) -> Result<(), String> {
        if self.access_key.trim().is_empty() {
            return Err("Access key cannot be empty".to_string());
        }
        if self.secret_key.expose_secret().trim().is_empty() {
            return Err("Secret key cannot be empty".to_string());
        }
        Ok(())
    }
}

fn read_env(name: &str) -> PushResult<String> {
    std::env::var(name)
        .map(|value| value.trim().to_string())
        .map_err(|_| PushError::Configuration(format!("{name} not set")))
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// API host, optionally with a port
    pub host: String,
    /// URL scheme, `http` or `https`
    pub scheme: String,
    /// HTTP settings
    pub api: APIConfig,
}

/// HTTP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct APIConfig {
    /// Emit request and response diagnostics through `tracing`
    pub enable_logging: bool,
    /// User agent for requests
    pub user_agent: String,
    /// Overall request timeout; unset means wait indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            scheme: "http".to_string(),
            api: APIConfig::default(),
        }
    }
}

impl Default for APIConfig {
    fn default() -> Self {
        Self {
            enable_logging: false,
            user_agent: format!("channel-push/{}", env!("CARGO_PKG_VERSION")),
            timeout_ms: None,
        }
    }
}

impl PushConfig {
    /// Default configuration with the host taken from `BAE_ENV_ADDR_CHANNEL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }
        config
    }

    /// Use a specific host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Base URL, e.g. `http://channel.api.duapp.com`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> PushResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PushError::Configuration(e.to_string()))
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> PushResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PushError::Configuration(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration directory
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_default().join("channel-push")
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if self.host.contains('/') {
            return Err(format!("Host must not contain a path: {}", self.host));
        }

        if self.scheme != "http" && self.scheme != "https" {
            return Err(format!("Unsupported scheme: {}", self.scheme));
        }

        if self.api.timeout_ms == Some(0) {
            return Err("API timeout cannot be zero".to_string());
        }

        Ok(())
    }
}
