//! Test utilities for issuing keys and faking stores
//!
//! These build real keys and records that go through the real derivation and
//! validation code paths. Prefer them over hand-written hashes.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::Rng;

use crate::error::{AuthError, Result};
use crate::key::{KEY_TAG, derive_key_components};
use crate::record::CredentialRecord;
use crate::store::CredentialStore;

/// Generate a random well-formed key: `vito_<namespace>_<48 hex chars>`
///
/// # Example
///
/// ```
/// use vito_auth::test_utils::generate_test_key;
/// use vito_auth::validate_key_format;
///
/// let key = generate_test_key("test");
/// assert!(validate_key_format(&key));
/// ```
pub fn generate_test_key(namespace: &str) -> String {
    let mut rng = rand::rng();
    let secret: [u8; 24] = rng.random();
    format!("{}{}_{}", KEY_TAG, namespace, hex::encode(secret))
}

/// Build an active, non-expiring record for a raw key
pub fn record_for_key(id: &str, tenant_id: &str, raw_key: &str, scopes: &[&str]) -> CredentialRecord {
    let components = derive_key_components(raw_key);

    CredentialRecord {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: None,
        key_prefix: components.prefix,
        key_hash: components.hash,
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        allowed_models: vec![],
        allowed_providers: vec![],
        is_active: true,
        expires_at: None,
        rate_limit_per_minute: 60,
        rate_limit_per_day: 10_000,
        max_cost_per_day_cents: None,
        max_cost_per_month_cents: None,
    }
}

/// Build a record sharing `raw_key`'s prefix but holding a different secret
///
/// Simulates a prefix collision between distinct keys.
pub fn colliding_record(id: &str, tenant_id: &str, raw_key: &str) -> CredentialRecord {
    let other = format!("{}{}", raw_key, generate_test_key("collide"));
    let mut record = record_for_key(id, tenant_id, &other, &[]);
    record.key_prefix = derive_key_components(raw_key).prefix;
    record
}

/// Store that returns a fixed candidate list in a fixed order
///
/// Ignores the prefix, so tests control exactly what the validator sees.
/// Counts queries to check one lookup per validation.
#[derive(Debug, Default)]
pub struct StaticStore {
    records: Vec<CredentialRecord>,
    queries: AtomicUsize,
}

impl StaticStore {
    /// Create a store returning `records` for every prefix
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self {
            records,
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of lookups served
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CredentialStore for StaticStore {
    async fn find_active_by_prefix(&self, _prefix: &str) -> Result<Vec<CredentialRecord>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.clone())
    }
}

/// Store that is always unreachable
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

#[async_trait]
impl CredentialStore for FailingStore {
    async fn find_active_by_prefix(&self, _prefix: &str) -> Result<Vec<CredentialRecord>> {
        Err(AuthError::store_unavailable("connection refused"))
    }
}
