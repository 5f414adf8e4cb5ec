//! Authentication error types
//!
//! Only infrastructure failures live here. A key that is unknown, expired or
//! under-scoped is not an error: it is a [`Denial`](crate::Denial) carried by
//! [`ValidationOutcome`](crate::ValidationOutcome).

use std::io;
use thiserror::Error;

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while validating keys or loading credential stores
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential store could not be queried
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),

    /// Prefix lookup returned more candidates than the validator accepts
    #[error("prefix lookup returned {count} candidates, above the configured limit")]
    CandidateLimitExceeded {
        /// Number of candidates returned by the store
        count: usize,
    },

    /// Failed to read a credentials file
    #[error("failed to read credentials file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Credentials file is not valid TOML or is missing fields
    #[error("invalid credentials file: {0}")]
    ParseError(String),

    /// Two records share the same key id
    #[error("duplicate key id '{id}'")]
    DuplicateKey {
        /// The repeated id
        id: String,
    },
}

impl AuthError {
    /// Create a StoreUnavailable error
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Create an IoError
    pub fn io_error(path: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError(message.into())
    }

    /// Create a DuplicateKey error
    pub fn duplicate_key(id: impl Into<String>) -> Self {
        Self::DuplicateKey { id: id.into() }
    }

    /// Whether this error means the store could not answer at all
    ///
    /// Callers map these to a service-unavailable response rather than an
    /// authentication failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::CandidateLimitExceeded { .. }
        )
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(e: toml::de::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}
