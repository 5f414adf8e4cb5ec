//! API-key authentication for Axum
//!
//! Turns request headers into an [`AuthenticatedKey`] or a [`KeyAuthError`]
//! that renders as the matching HTTP response.
//!
//! # Setup
//!
//! Your app state must implement `HasKeyValidator`:
//!
//! ```ignore
//! use std::sync::Arc;
//! use vito_auth::{KeyValidator, MemoryCredentialStore};
//! use vito_api::auth::HasKeyValidator;
//!
//! struct AppState {
//!     validator: KeyValidator,
//! }
//!
//! impl HasKeyValidator for AppState {
//!     fn key_validator(&self) -> &KeyValidator {
//!         &self.validator
//!     }
//! }
//!
//! let store = Arc::new(MemoryCredentialStore::from_file("keys.toml")?);
//! let state = AppState {
//!     validator: KeyValidator::new(store),
//! };
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use vito_auth::{
    Denial, EXPIRED_MESSAGE, KeyValidator, NOT_FOUND_OR_INACTIVE_MESSAGE, ValidatedKey,
    ValidationOutcome, extract_api_key, validate_key_format,
};

/// Trait for app state that provides a key validator
///
/// Implement this trait on your app state to enable the key extractors.
pub trait HasKeyValidator: Send + Sync {
    /// Get the key validator
    fn key_validator(&self) -> &KeyValidator;
}

/// Error returned when API-key authentication fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAuthError {
    /// No key in `Authorization: Bearer` or `x-api-key`
    MissingKey,
    /// Key failed the format check and was never looked up
    InvalidKey,
    /// No active credential matches the key
    NotFoundOrInactive,
    /// Matched credential has expired
    Expired,
    /// Matched credential lacks the required scope
    InsufficientScope(String),
    /// Credential store could not answer
    StoreUnavailable,
}

impl KeyAuthError {
    /// Stable error code used in the response body
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingKey => "AUTH_REQUIRED",
            Self::InvalidKey | Self::NotFoundOrInactive => "INVALID_API_KEY",
            Self::Expired => "API_KEY_EXPIRED",
            Self::InsufficientScope(_) => "INSUFFICIENT_SCOPE",
            Self::StoreUnavailable => "AUTH_UNAVAILABLE",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingKey | Self::InvalidKey | Self::NotFoundOrInactive | Self::Expired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientScope(_) => StatusCode::FORBIDDEN,
            Self::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingKey => "API key required".to_string(),
            // Malformed and unknown keys get the same body
            Self::InvalidKey | Self::NotFoundOrInactive => {
                NOT_FOUND_OR_INACTIVE_MESSAGE.to_string()
            }
            Self::Expired => EXPIRED_MESSAGE.to_string(),
            Self::InsufficientScope(required) => Denial::InsufficientScope {
                required: required.clone(),
            }
            .to_string(),
            Self::StoreUnavailable => "Authentication temporarily unavailable".to_string(),
        }
    }
}

impl From<Denial> for KeyAuthError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::NotFoundOrInactive => Self::NotFoundOrInactive,
            Denial::Expired => Self::Expired,
            Denial::InsufficientScope { required } => Self::InsufficientScope(required),
        }
    }
}

impl IntoResponse for KeyAuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.message(),
        });

        (self.status(), Json(body)).into_response()
    }
}

/// Key context attached to an authenticated request
///
/// Inserted into request extensions by [`RequireScopeLayer`] and the typed
/// extractors.
///
/// [`RequireScopeLayer`]: super::RequireScopeLayer
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedKey {
    /// Per-request id for correlating logs
    pub correlation_id: Uuid,
    /// Validated key context
    #[serde(flatten)]
    pub key: ValidatedKey,
}

impl AuthenticatedKey {
    /// Wrap a validated key with a fresh correlation id
    pub fn new(key: ValidatedKey) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            key,
        }
    }

    /// Owning tenant
    pub fn tenant_id(&self) -> &str {
        &self.key.tenant_id
    }

    /// Key ID
    pub fn key_id(&self) -> &str {
        &self.key.key_id
    }

    /// Check if the key holds a scope
    pub fn has_scope(&self, scope: &str) -> bool {
        self.key.scopes.iter().any(|s| s == scope)
    }
}

impl std::ops::Deref for AuthenticatedKey {
    type Target = ValidatedKey;

    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

/// Authenticate a request's headers against a required scope
///
/// Extracts the key, rejects malformed keys without a store round-trip, then
/// runs the validator. Store and candidate-limit failures become
/// `StoreUnavailable`.
pub async fn authenticate(
    headers: &HeaderMap,
    validator: &KeyValidator,
    scope: &str,
) -> Result<AuthenticatedKey, KeyAuthError> {
    let raw = extract_api_key(headers).ok_or(KeyAuthError::MissingKey)?;

    if !validate_key_format(&raw) {
        return Err(KeyAuthError::InvalidKey);
    }

    let outcome = validator.validate(&raw, scope).await.map_err(|e| {
        let correlation_id = Uuid::new_v4();
        error!(%correlation_id, error = %e, "key validation failed");
        KeyAuthError::StoreUnavailable
    })?;

    match outcome {
        ValidationOutcome::Valid(key) => Ok(AuthenticatedKey::new(key)),
        ValidationOutcome::Denied(denial) => Err(denial.into()),
    }
}

/// Reads the key attached by a scope layer
///
/// Only use behind [`RequireScopeLayer`]; without it every request is
/// rejected with `AUTH_REQUIRED`.
///
/// [`RequireScopeLayer`]: super::RequireScopeLayer
impl<S> FromRequestParts<S> for AuthenticatedKey
where
    S: Send + Sync,
{
    type Rejection = KeyAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedKey>()
            .cloned()
            .ok_or(KeyAuthError::MissingKey)
    }
}
