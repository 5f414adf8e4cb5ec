//! Key component derivation and format checks
//!
//! Raw keys look like `vito_<namespace>_<secret>`. Only two values are ever
//! derived from them:
//!
//! - the **prefix**, the first [`PREFIX_LENGTH`] characters, used as a
//!   non-secret storage index
//! - the **hash**, the hex SHA-256 digest of the whole key, the only value
//!   compared against stored credentials

use sha2::{Digest, Sha256};

/// Literal tag every key starts with
pub const KEY_TAG: &str = "vito_";

/// Number of leading characters used as the lookup prefix
pub const PREFIX_LENGTH: usize = 16;

/// Shortest key accepted by [`validate_key_format`]
///
/// Leaves at least four characters of secret material past the prefix.
pub const MIN_KEY_LENGTH: usize = 20;

/// Length of a SHA-256 digest in bytes
pub const KEY_HASH_LENGTH: usize = 32;

/// Length of a hex encoded SHA-256 digest
pub const KEY_HASH_HEX_LENGTH: usize = KEY_HASH_LENGTH * 2;

/// Prefix and hash derived from a raw key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyComponents {
    /// Lookup prefix (not secret)
    pub prefix: String,
    /// Lowercase hex SHA-256 of the full key
    pub hash: String,
    digest: [u8; KEY_HASH_LENGTH],
}

impl KeyComponents {
    /// Raw digest bytes, for constant-time comparison
    #[inline]
    pub fn hash_bytes(&self) -> &[u8; KEY_HASH_LENGTH] {
        &self.digest
    }
}

/// Split a raw key into its lookup prefix and verification hash
///
/// Never panics: input shorter than [`PREFIX_LENGTH`] yields the whole input
/// as the prefix.
///
/// # Example
///
/// ```
/// use vito_auth::derive_key_components;
///
/// let parts = derive_key_components("vito_test_abc123def456");
/// assert_eq!(parts.prefix, "vito_test_abc123");
/// assert_eq!(parts.hash.len(), 64);
/// ```
pub fn derive_key_components(raw_key: &str) -> KeyComponents {
    let digest: [u8; KEY_HASH_LENGTH] = Sha256::digest(raw_key.as_bytes()).into();

    KeyComponents {
        prefix: key_prefix(raw_key).to_string(),
        hash: hex::encode(digest),
        digest,
    }
}

/// First [`PREFIX_LENGTH`] characters of a key
///
/// Cuts on a character boundary so multi-byte input cannot split a code point.
pub fn key_prefix(raw_key: &str) -> &str {
    match raw_key.char_indices().nth(PREFIX_LENGTH) {
        Some((end, _)) => &raw_key[..end],
        None => raw_key,
    }
}

/// Hex SHA-256 of a raw key, as persisted in credential records
pub fn hash_key(raw_key: &str) -> String {
    hex::encode(Sha256::digest(raw_key.as_bytes()))
}

/// Cheap structural check, no store access
///
/// A key passes when it is at least [`MIN_KEY_LENGTH`] long, starts with
/// [`KEY_TAG`] and splits into at least three `_` separated segments
/// (tag, namespace, secret).
pub fn validate_key_format(raw_key: &str) -> bool {
    if raw_key.is_empty() || raw_key.len() < MIN_KEY_LENGTH {
        return false;
    }

    if !raw_key.starts_with(KEY_TAG) {
        return false;
    }

    raw_key.split('_').count() >= 3
}
