//! Credential record model
//!
//! Records are owned by the credential store. This crate only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored API key credential
///
/// Only the SHA-256 hash of the key is persisted. `key_prefix` is the
/// indexed, non-secret lookup field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Unique key ID
    pub id: String,
    /// Owning tenant
    pub tenant_id: String,
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// First 16 characters of the key (lookup index)
    pub key_prefix: String,
    /// Lowercase hex SHA-256 of the full key
    pub key_hash: String,
    /// Capabilities granted to this key
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Models this key may use (empty = any)
    #[serde(default)]
    pub allowed_models: Vec<String>,
    /// Providers this key may use (empty = any)
    #[serde(default)]
    pub allowed_providers: Vec<String>,
    /// Whether the key is active
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// When the key expires (None = never)
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Requests per minute quota
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
    /// Requests per day quota
    #[serde(default = "default_rate_limit_per_day")]
    pub rate_limit_per_day: u32,
    /// Daily spend ceiling in cents
    #[serde(default)]
    pub max_cost_per_day_cents: Option<u64>,
    /// Monthly spend ceiling in cents
    #[serde(default)]
    pub max_cost_per_month_cents: Option<u64>,
}

fn default_active() -> bool {
    true
}

fn default_rate_limit_per_minute() -> u32 {
    60
}

fn default_rate_limit_per_day() -> u32 {
    10_000
}

impl CredentialRecord {
    /// Check if the key is expired at `now`
    ///
    /// A key expiring exactly at `now` counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    /// Check if the key grants a scope
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
