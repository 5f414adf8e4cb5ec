//! Vito - API key authentication
//!
//! Extraction, derivation and scope validation for tenant API keys.
//!
//! # Key format
//!
//! ```text
//! vito_<namespace>_<secret>
//! ```
//!
//! - The first 16 characters are a non-secret **prefix** used to index the
//!   credential store
//! - Only the SHA-256 **hash** of the full key is stored and compared
//!
//! # Pipeline
//!
//! ```text
//! headers ──extract_api_key──▶ raw key ──derive_key_components──▶ (prefix, hash)
//!     ──KeyValidator──▶ store lookup ──▶ constant-time match ──▶ expiry ──▶ scope
//! ```
//!
//! Denials come back as [`ValidationOutcome::Denied`]. Only infrastructure
//! failures (store unreachable) are errors, so callers never confuse "key
//! invalid" with "could not check the key".

mod error;
mod extract;
mod key;
mod outcome;
mod record;
mod store;
mod validator;

/// Test utilities for issuing keys and faking stores
pub mod test_utils;


pub use error::{AuthError, Result};
pub use extract::{API_KEY_HEADER, MAX_KEY_SIZE, extract_api_key};
pub use key::{
    KEY_HASH_HEX_LENGTH, KEY_HASH_LENGTH, KEY_TAG, KeyComponents, MIN_KEY_LENGTH, PREFIX_LENGTH,
    derive_key_components, hash_key, key_prefix, validate_key_format,
};
pub use outcome::{
    Denial, DenialKind, EXPIRED_MESSAGE, NOT_FOUND_OR_INACTIVE_MESSAGE, PolicyDenial,
    ValidatedKey, ValidationOutcome, ValidationResult,
};
pub use record::CredentialRecord;
pub use store::{CredentialStore, MemoryCredentialStore, SharedCredentialStore};
pub use validator::{DEFAULT_MAX_CANDIDATES, KeyValidator};
