//! Configuration validation
//!
//! Validates config consistency:
//! - Candidate cap is at least one
//! - Store reload interval is not degenerate
//! - API bind address parses and the required scope is usable

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};

/// Shortest accepted store reload interval
const MIN_RELOAD_INTERVAL: Duration = Duration::from_secs(1);

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_validator(config)?;
    validate_store(config)?;
    validate_api(config)?;
    Ok(())
}

fn validate_validator(config: &Config) -> Result<()> {
    if config.validator.max_candidates == 0 {
        return Err(ConfigError::invalid_value(
            "validator",
            "max_candidates",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_store(config: &Config) -> Result<()> {
    if config.store.path.as_os_str().is_empty() {
        return Err(ConfigError::invalid_value(
            "store",
            "path",
            "must not be empty",
        ));
    }

    if let Some(interval) = config.store.reload_interval
        && interval < MIN_RELOAD_INTERVAL
    {
        return Err(ConfigError::invalid_value(
            "store",
            "reload_interval",
            format!("must be at least 1s, got {:?}", interval),
        ));
    }

    Ok(())
}

fn validate_api(config: &Config) -> Result<()> {
    let scope = &config.api.required_scope;
    if scope.is_empty() {
        return Err(ConfigError::invalid_value(
            "api",
            "required_scope",
            "must not be empty",
        ));
    }
    if scope.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid_value(
            "api",
            "required_scope",
            format!("must not contain whitespace: '{}'", scope),
        ));
    }

    if config.api.socket_addr().is_none() {
        return Err(ConfigError::invalid_value(
            "api",
            "host",
            format!(
                "'{}:{}' is not a valid socket address",
                config.api.host, config.api.port
            ),
        ));
    }

    Ok(())
}
