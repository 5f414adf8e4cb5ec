//! Vito - API-key validator
//!
//! # Usage
//!
//! ```bash
//! # Check a key's format
//! vito check vito_live_0123456789abcdef
//!
//! # Derive the stored prefix and hash for provisioning
//! vito derive vito_live_0123456789abcdef
//!
//! # Validate a key against a credentials file
//! vito validate --store keys.toml --scope api:read vito_live_0123456789abcdef
//!
//! # Run the HTTP server
//! vito serve --config configs/vito.toml
//! ```
//!
//! Commands that take a key read it from stdin when the argument is omitted.

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vito_config::{LogConfig, LogFormat, LogOutput};

/// Vito - API-key validator
#[derive(Parser, Debug)]
#[command(name = "vito")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a key is well-formed
    Check(cmd::check::CheckArgs),

    /// Print the prefix and hash stored for a key
    Derive(cmd::derive::DeriveArgs),

    /// Validate a key against a credentials file
    Validate(cmd::validate::ValidateArgs),

    /// Run the HTTP server
    Serve(cmd::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check(args) => {
            // Check doesn't need logging - just outputs to stdout
            cmd::check::run(args)
        }
        Command::Derive(args) => {
            // Derive doesn't need logging - just outputs to stdout
            cmd::derive::run(args)
        }
        Command::Validate(args) => {
            // Validator warnings go to stderr so stdout stays valid JSON
            let log = LogConfig {
                output: LogOutput::Stderr,
                ..LogConfig::default()
            };
            init_logging(cli.log_level.as_deref().unwrap_or("warn"), &log)?;
            cmd::validate::run(args).await
        }
        Command::Serve(args) => {
            let config = cmd::serve::load_config(args.config.as_deref())?;
            let level = cli
                .log_level
                .as_deref()
                .unwrap_or(config.log.level.as_str());
            init_logging(level, &config.log)?;
            cmd::serve::run(config).await
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match log.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let (console, json) = match log.format {
        LogFormat::Console => (
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(writer),
            ),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(writer))),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(json)
        .with(filter)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_validate() {
        let cli = Cli::try_parse_from([
            "vito",
            "validate",
            "--store",
            "keys.toml",
            "--scope",
            "api:read",
            "vito_test_abc123def456",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Validate(_)));
    }

    #[test]
    fn test_cli_global_log_level() {
        let cli = Cli::try_parse_from(["vito", "serve", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["vito"]).is_err());
    }
}
