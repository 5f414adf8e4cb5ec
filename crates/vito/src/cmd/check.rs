//! Check command - Verify a key is well-formed
//!
//! Format only: no store is consulted.

use anyhow::{Result, bail};
use clap::Args;
use vito_auth::{KEY_TAG, MIN_KEY_LENGTH, validate_key_format};

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Key to check (read from stdin if omitted)
    pub key: Option<String>,
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    let key = super::read_key(args.key)?;

    if !validate_key_format(&key) {
        bail!(
            "invalid key format: expected '{}<env>_<secret>', at least {} characters",
            KEY_TAG,
            MIN_KEY_LENGTH
        );
    }

    println!("valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_key() {
        let args = CheckArgs {
            key: Some("vito_test_abc123def456".into()),
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn test_invalid_key() {
        let args = CheckArgs {
            key: Some("sk_test_abc123def456xyz".into()),
        };
        let err = run(args).unwrap_err();
        assert!(err.to_string().contains("vito_"));
    }
}
