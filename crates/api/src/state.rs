//! Application state
//!
//! Shared state for API handlers: the key validator and server start time.

use std::time::Instant;

use vito_auth::{KeyValidator, SharedCredentialStore};

use crate::auth::HasKeyValidator;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Key validator backed by the credential store
    pub validator: KeyValidator,
    /// Server start time for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create state around an existing validator
    pub fn new(validator: KeyValidator) -> Self {
        Self {
            validator,
            started_at: Instant::now(),
        }
    }

    /// Create state with a default validator over `store`
    pub fn from_store(store: SharedCredentialStore) -> Self {
        Self::new(KeyValidator::new(store))
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl HasKeyValidator for AppState {
    fn key_validator(&self) -> &KeyValidator {
        &self.validator
    }
}
