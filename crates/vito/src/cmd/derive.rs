//! Derive command - Print the stored form of a key
//!
//! Output is a TOML fragment ready to paste into a `[[keys]]` table.

use anyhow::Result;
use clap::Args;
use vito_auth::{derive_key_components, validate_key_format};

/// Derive command arguments
#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Key to derive from (read from stdin if omitted)
    pub key: Option<String>,
}

/// Run the derive command
pub fn run(args: DeriveArgs) -> Result<()> {
    let key = super::read_key(args.key)?;

    if !validate_key_format(&key) {
        eprintln!("warning: key is not well-formed and will be rejected by the server");
    }

    print!("{}", render(&key));
    Ok(())
}

fn render(key: &str) -> String {
    let components = derive_key_components(key);
    format!(
        "key_prefix = \"{}\"\nkey_hash = \"{}\"\n",
        components.prefix, components.hash
    )
}
