//! Validate command - Run the validator against a credentials file
//!
//! Prints the validation result as JSON. Exits non-zero when the key is
//! rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use vito_auth::{
    DEFAULT_MAX_CANDIDATES, KeyValidator, MemoryCredentialStore, ValidationOutcome,
    ValidationResult,
};

/// Validate command arguments
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Credentials file (TOML, `[[keys]]` tables)
    #[arg(short, long)]
    pub store: PathBuf,

    /// Scope the key must hold
    #[arg(long)]
    pub scope: String,

    /// Maximum candidates accepted for one prefix
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    pub max_candidates: usize,

    /// Key to validate (read from stdin if omitted)
    pub key: Option<String>,
}

/// Run the validate command
pub async fn run(args: ValidateArgs) -> Result<()> {
    let key = super::read_key(args.key)?;
    let outcome = validate(&args.store, &args.scope, args.max_candidates, &key).await?;
    let valid = outcome.is_valid();

    let result = ValidationResult::from(outcome);
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !valid {
        bail!("key rejected");
    }
    Ok(())
}

async fn validate(
    store: &Path,
    scope: &str,
    max_candidates: usize,
    key: &str,
) -> Result<ValidationOutcome> {
    let store = MemoryCredentialStore::from_file(store)
        .with_context(|| format!("failed to load credentials from {}", store.display()))?;
    let validator = KeyValidator::new(Arc::new(store)).with_max_candidates(max_candidates);

    validator
        .validate(key, scope)
        .await
        .context("key validation failed")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use vito_auth::{DenialKind, hash_key, key_prefix};

    const KEY: &str = "vito_test_abc123def456";

    fn store_file(scopes: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[[keys]]\nid = \"key-1\"\ntenant_id = \"tenant-1\"\nkey_prefix = \"{}\"\nkey_hash = \"{}\"\nscopes = {}\n",
            key_prefix(KEY),
            hash_key(KEY),
            scopes
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_validate_from_file() {
        let file = store_file("[\"api:read\"]");
        let path = file.path();

        let outcome = validate(path, "api:read", 50, KEY).await.unwrap();
        assert_eq!(outcome.key().unwrap().tenant_id, "tenant-1");
    }

    #[tokio::test]
    async fn test_validate_wrong_scope() {
        let file = store_file("[\"api:read\"]");
        let path = file.path();

        let outcome = validate(path, "api:write", 50, KEY).await.unwrap();
        assert_eq!(
            outcome.denial().unwrap().kind(),
            DenialKind::InsufficientScope
        );
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let path = Path::new("/nonexistent/keys.toml");
        let err = validate(path, "api:read", 50, KEY).await.unwrap_err();
        assert!(err.to_string().contains("failed to load credentials"));
    }
}
