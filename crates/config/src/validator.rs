//! Validator and credential store configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use vito_auth::DEFAULT_MAX_CANDIDATES;

/// Key validator settings
///
/// # Example
///
/// ```toml
/// [validator]
/// max_candidates = 50
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum candidates accepted for a single prefix lookup
    /// Default: 50
    pub max_candidates: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// File-backed credential store settings
///
/// # Example
///
/// ```toml
/// [store]
/// path = "keys.toml"
/// reload_interval = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the TOML credentials file
    /// Default: "keys.toml"
    pub path: PathBuf,

    /// How often to reload the credentials file (omit to disable)
    #[serde(with = "humantime_serde")]
    pub reload_interval: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("keys.toml"),
            reload_interval: None,
        }
    }
}
