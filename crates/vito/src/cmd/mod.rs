//! Command implementations for the Vito CLI

pub mod check;
pub mod derive;
pub mod serve;
pub mod validate;

use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};

/// Resolve a key argument, reading one line from stdin when it is omitted
///
/// Keeps keys out of shell history: `echo "$KEY" | vito check`.
pub fn read_key(arg: Option<String>) -> Result<String> {
    if let Some(key) = arg {
        return Ok(key);
    }

    read_key_from(io::stdin().lock())
}

fn read_key_from(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read key from stdin")?;

    let key = line.trim();
    if key.is_empty() {
        bail!("no key given: pass it as an argument or on stdin");
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_key_prefers_argument() {
        let key = read_key(Some("vito_test_abc123def456".into())).unwrap();
        assert_eq!(key, "vito_test_abc123def456");
    }

    #[test]
    fn test_read_key_from_reader_trims() {
        let key = read_key_from(&b"  vito_test_abc123def456\n"[..]).unwrap();
        assert_eq!(key, "vito_test_abc123def456");
    }

    #[test]
    fn test_read_key_from_empty_reader() {
        assert!(read_key_from(&b"\n"[..]).is_err());
    }
}
