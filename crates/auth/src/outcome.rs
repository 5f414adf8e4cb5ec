//! Validation outcome types
//!
//! A validation either yields a [`ValidatedKey`] or exactly one [`Denial`].
//! Callers branch on [`DenialKind`]; the rendered messages are fixed so every
//! surface reports the same text.

use std::fmt;

use serde::Serialize;

use crate::record::CredentialRecord;

/// Message shared by unknown prefix, revoked key and wrong secret
pub const NOT_FOUND_OR_INACTIVE_MESSAGE: &str = "API key not found or inactive";

/// Message for a matched but expired key
pub const EXPIRED_MESSAGE: &str = "API key expired";

/// Stable denial taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialKind {
    /// Unknown prefix, revoked key, or wrong secret
    NotFoundOrInactive,
    /// Key matched but is past its expiry
    Expired,
    /// Key is valid but lacks the required scope
    InsufficientScope,
}

impl DenialKind {
    /// Stable identifier for logs and API bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFoundOrInactive => "NOT_FOUND_OR_INACTIVE",
            Self::Expired => "EXPIRED",
            Self::InsufficientScope => "INSUFFICIENT_SCOPE",
        }
    }
}

impl fmt::Display for DenialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a key was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// No active candidate matched the key
    NotFoundOrInactive,
    /// Key matched but has expired
    Expired,
    /// Key lacks the scope the route requires
    InsufficientScope {
        /// The scope that was required
        required: String,
    },
}

impl Denial {
    /// Taxonomy kind of this denial
    pub fn kind(&self) -> DenialKind {
        match self {
            Self::NotFoundOrInactive => DenialKind::NotFoundOrInactive,
            Self::Expired => DenialKind::Expired,
            Self::InsufficientScope { .. } => DenialKind::InsufficientScope,
        }
    }

    /// True when the caller is known but not allowed (403-class)
    ///
    /// Everything else is an authentication failure (401-class).
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, Self::InsufficientScope { .. })
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFoundOrInactive => f.write_str(NOT_FOUND_OR_INACTIVE_MESSAGE),
            Self::Expired => f.write_str(EXPIRED_MESSAGE),
            Self::InsufficientScope { required } => {
                write!(f, "Insufficient scope. Required: {}", required)
            }
        }
    }
}

/// Downstream policy refusal for provider/model allow-lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDenial {
    /// Provider is not in the key's allow-list
    ProviderNotAllowed(String),
    /// Model is not in the key's allow-list
    ModelNotAllowed(String),
}

impl fmt::Display for PolicyDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderNotAllowed(p) => write!(f, "Provider not allowed: {}", p),
            Self::ModelNotAllowed(m) => write!(f, "Model not allowed: {}", m),
        }
    }
}

/// Context of a successfully validated key
///
/// Limits are copied through unchanged; enforcing them is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedKey {
    /// Owning tenant
    pub tenant_id: String,
    /// Key ID
    pub key_id: String,
    /// Granted scopes
    pub scopes: Vec<String>,
    /// Allowed models (empty = any)
    pub allowed_models: Vec<String>,
    /// Allowed providers (empty = any)
    pub allowed_providers: Vec<String>,
    /// Requests per minute quota
    pub rate_limit_per_minute: u32,
    /// Requests per day quota
    pub rate_limit_per_day: u32,
    /// Daily spend ceiling in cents
    pub max_cost_per_day_cents: Option<u64>,
    /// Monthly spend ceiling in cents
    pub max_cost_per_month_cents: Option<u64>,
}

impl ValidatedKey {
    /// Check the provider allow-list
    pub fn check_provider(&self, provider: &str) -> Result<(), PolicyDenial> {
        if allow_listed(&self.allowed_providers, provider) {
            Ok(())
        } else {
            Err(PolicyDenial::ProviderNotAllowed(provider.to_string()))
        }
    }

    /// Check the model allow-list
    pub fn check_model(&self, model: &str) -> Result<(), PolicyDenial> {
        if allow_listed(&self.allowed_models, model) {
            Ok(())
        } else {
            Err(PolicyDenial::ModelNotAllowed(model.to_string()))
        }
    }
}

fn allow_listed(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v == value)
}

impl From<CredentialRecord> for ValidatedKey {
    fn from(record: CredentialRecord) -> Self {
        Self {
            tenant_id: record.tenant_id,
            key_id: record.id,
            scopes: record.scopes,
            allowed_models: record.allowed_models,
            allowed_providers: record.allowed_providers,
            rate_limit_per_minute: record.rate_limit_per_minute,
            rate_limit_per_day: record.rate_limit_per_day,
            max_cost_per_day_cents: record.max_cost_per_day_cents,
            max_cost_per_month_cents: record.max_cost_per_month_cents,
        }
    }
}

/// Result of validating a key against a required scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Key is authentic, unexpired and carries the scope
    Valid(ValidatedKey),
    /// Key was refused
    Denied(Denial),
}

impl ValidationOutcome {
    /// Whether the key was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The validated key, if accepted
    pub fn key(&self) -> Option<&ValidatedKey> {
        match self {
            Self::Valid(key) => Some(key),
            Self::Denied(_) => None,
        }
    }

    /// The denial, if refused
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Valid(_) => None,
            Self::Denied(denial) => Some(denial),
        }
    }
}

/// Flat, serializable view of a [`ValidationOutcome`]
///
/// Identity and limit fields are present only when `is_valid` is true;
/// `error` only when it is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the key was accepted
    pub is_valid: bool,
    /// Owning tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Key ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Granted scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// Allowed models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_models: Option<Vec<String>>,
    /// Allowed providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_providers: Option<Vec<String>>,
    /// Requests per minute quota
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,
    /// Requests per day quota
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_day: Option<u32>,
    /// Daily spend ceiling in cents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cost_per_day_cents: Option<u64>,
    /// Monthly spend ceiling in cents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cost_per_month_cents: Option<u64>,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ValidationOutcome> for ValidationResult {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid(key) => Self {
                is_valid: true,
                tenant_id: Some(key.tenant_id),
                key_id: Some(key.key_id),
                scopes: Some(key.scopes),
                allowed_models: Some(key.allowed_models),
                allowed_providers: Some(key.allowed_providers),
                rate_limit_per_minute: Some(key.rate_limit_per_minute),
                rate_limit_per_day: Some(key.rate_limit_per_day),
                max_cost_per_day_cents: key.max_cost_per_day_cents,
                max_cost_per_month_cents: key.max_cost_per_month_cents,
                error: None,
            },
            ValidationOutcome::Denied(denial) => Self {
                is_valid: false,
                tenant_id: None,
                key_id: None,
                scopes: None,
                allowed_models: None,
                allowed_providers: None,
                rate_limit_per_minute: None,
                rate_limit_per_day: None,
                max_cost_per_day_cents: None,
                max_cost_per_month_cents: None,
                error: Some(denial.to_string()),
            },
        }
    }
}
