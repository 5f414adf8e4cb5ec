//! API key validator
//!
//! Validation is a linear pipeline:
//!
//! 1. derive prefix and hash from the raw key
//! 2. fetch active candidates for the prefix (one store query)
//! 3. select the matching candidate in constant time
//! 4. reject if nothing matched
//! 5. reject if the matched key has expired
//! 6. reject if the matched key lacks the required scope
//! 7. return the key context
//!
//! # Security
//!
//! Candidate selection compares every candidate's stored hash against the
//! computed hash with a constant-time primitive and never exits early. An
//! empty candidate set and a set with no match produce the same denial, so
//! responses never reveal whether a prefix exists.

use chrono::{DateTime, Utc};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::key::{KEY_HASH_LENGTH, derive_key_components};
use crate::outcome::{Denial, ValidationOutcome};
use crate::record::CredentialRecord;
use crate::store::SharedCredentialStore;

/// Default cap on candidates returned for a single prefix
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Validates raw API keys against a credential store
///
/// Stateless apart from the store handle; safe to share across tasks.
///
/// # Example
///
/// ```ignore
/// let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::from_file("keys.toml")?);
/// let validator = KeyValidator::new(store);
///
/// match validator.validate(&raw_key, "agents:financial").await? {
///     ValidationOutcome::Valid(key) => println!("tenant {}", key.tenant_id),
///     ValidationOutcome::Denied(denial) => println!("denied: {}", denial),
/// }
/// ```
#[derive(Clone)]
pub struct KeyValidator {
    store: SharedCredentialStore,
    max_candidates: usize,
}

impl std::fmt::Debug for KeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValidator")
            .field("max_candidates", &self.max_candidates)
            .finish()
    }
}

impl KeyValidator {
    /// Create a validator over a store
    pub fn new(store: SharedCredentialStore) -> Self {
        Self {
            store,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    /// Set the maximum number of candidates accepted for one prefix
    ///
    /// A lookup returning more than `max_candidates` rows fails with
    /// [`AuthError::CandidateLimitExceeded`]; exactly `max_candidates` rows is
    /// accepted. Stores return every active row for a prefix, so the cap is
    /// applied here rather than in the query. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    /// Configured candidate cap
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    /// Validate a raw key against a required scope
    ///
    /// # Errors
    ///
    /// Returns `AuthError` only for infrastructure failures (store
    /// unreachable, candidate cap exceeded). Authentication and
    /// authorization refusals are `Ok(ValidationOutcome::Denied(_))`.
    pub async fn validate(&self, raw_key: &str, required_scope: &str) -> Result<ValidationOutcome> {
        self.validate_at(raw_key, required_scope, Utc::now()).await
    }

    /// Validate with an explicit notion of "now" for expiry checks
    pub async fn validate_at(
        &self,
        raw_key: &str,
        required_scope: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidationOutcome> {
        let components = derive_key_components(raw_key);

        let candidates = self
            .store
            .find_active_by_prefix(&components.prefix)
            .await?;

        if candidates.len() > self.max_candidates {
            // Prefix is a non-secret index; never log the hash or tenant
            warn!(
                prefix = %components.prefix,
                count = candidates.len(),
                "prefix candidate limit exceeded"
            );
            return Err(AuthError::CandidateLimitExceeded {
                count: candidates.len(),
            });
        }

        let Some(record) = select_candidate(components.hash_bytes(), candidates) else {
            return Ok(deny(Denial::NotFoundOrInactive));
        };

        if record.is_expired_at(now) {
            return Ok(deny(Denial::Expired));
        }

        if !record.has_scope(required_scope) {
            return Ok(deny(Denial::InsufficientScope {
                required: required_scope.to_string(),
            }));
        }

        debug!(key_id = %record.id, "API key validated");
        Ok(ValidationOutcome::Valid(record.into()))
    }
}

fn deny(denial: Denial) -> ValidationOutcome {
    debug!(kind = %denial.kind(), "API key denied");
    ValidationOutcome::Denied(denial)
}

/// Pick the candidate whose stored hash equals `computed`
///
/// Every candidate is compared; the match index is folded in with
/// conditional selection so the loop body is identical whether or not (and
/// wherever) a match occurs. When several candidates carry the same hash the
/// first one in store order is selected.
fn select_candidate(
    computed: &[u8; KEY_HASH_LENGTH],
    candidates: Vec<CredentialRecord>,
) -> Option<CredentialRecord> {
    let mut matched = Choice::from(0);
    let mut index = 0u64;

    for (i, candidate) in candidates.iter().enumerate() {
        let (stored, well_formed) = decode_stored_hash(&candidate.key_hash);
        let is_match = computed[..].ct_eq(&stored[..]) & well_formed;

        let first = is_match & !matched;

        index.conditional_assign(&(i as u64), first);
        matched |= is_match;
    }

    if bool::from(matched) {
        candidates.into_iter().nth(index as usize)
    } else {
        None
    }
}

/// Decode a stored hex digest
///
/// A malformed or wrong-length value decodes to zeros and is flagged so it
/// can never match, while still going through the same comparison.
fn decode_stored_hash(key_hash: &str) -> ([u8; KEY_HASH_LENGTH], Choice) {
    let mut stored = [0u8; KEY_HASH_LENGTH];

    if hex::decode_to_slice(key_hash, &mut stored).is_ok() {
        (stored, Choice::from(1))
    } else {
        warn!("stored key hash is not a 64 character hex digest");
        ([0u8; KEY_HASH_LENGTH], Choice::from(0))
    }
}
