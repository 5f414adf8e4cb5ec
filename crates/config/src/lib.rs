//! Vito Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use vito_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[store]\npath = \"keys.toml\"").unwrap();
//! assert_eq!(config.validator.max_candidates, 50);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "json"
//!
//! [validator]
//! max_candidates = 50
//!
//! [store]
//! path = "/etc/vito/keys.toml"
//! reload_interval = "30s"
//!
//! [api]
//! host = "0.0.0.0"
//! port = 8080
//! required_scope = "api:read"
//! ```

mod api_server;
mod error;
mod logging;
mod validation;
mod validator;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use api_server::ApiServerConfig;
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use validator::{StoreConfig, ValidatorConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Key validator settings
    pub validator: ValidatorConfig,

    /// Credential store settings
    pub store: StoreConfig,

    /// HTTP server settings
    pub api: ApiServerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
