//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Server configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub server: ServerConfig,
    pub protocol: ProtocolConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    /// Address to listen and serve on
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProtocolConfig {
    /// Largest SEND body accepted, in bytes
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is not set
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:80".to_string(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("SLCK_ADDR") {
            self.server.addr = addr;
        }

        if let Ok(level) = std::env::var("SLCK_LOG") {
            self.logging.level = level;
        }

        if let Ok(max) = std::env::var("SLCK_MAX_BODY_BYTES") {
            match max.parse() {
                Ok(max) => self.protocol.max_body_bytes = max,
                Err(_) => tracing::warn!("Ignoring SLCK_MAX_BODY_BYTES={:?}: not a number", max),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.addr.trim().is_empty() {
            return Err(ConfigError::MissingField("server.addr".to_string()));
        }
        if self.protocol.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "protocol.max-body-bytes must be greater than 0".to_string(),
            ));
        }
        self.logging
            .level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::InvalidValue(format!("logging.level: {}", self.logging.level)))?;
        Ok(())
    }
}
