//! Serve command - Run the HTTP server
//!
//! Loads the credentials file into memory and serves the key-gated API.
//! The file is reloaded on `store.reload_interval` and on SIGHUP.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use vito_api::{AppState, build_router};
use vito_auth::{KeyValidator, MemoryCredentialStore};
use vito_config::Config;

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/vito.toml or vito.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load configuration from an explicit path, a default path, or defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        // User explicitly provided config path - must exist
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path).context("failed to load configuration");
    }

    let default_paths = [PathBuf::from("configs/vito.toml"), PathBuf::from("vito.toml")];
    for path in &default_paths {
        if path.exists() {
            return Config::from_file(path).context("failed to load configuration");
        }
    }

    Ok(Config::default())
}

/// Run the serve command
pub async fn run(config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        store = %config.store.path.display(),
        "vito starting"
    );

    let store = Arc::new(
        MemoryCredentialStore::from_file(&config.store.path)
            .context("failed to load credential store")?,
    );
    info!(keys = store.len(), "credential store loaded");

    if let Some(interval) = config.store.reload_interval {
        spawn_periodic_reload(Arc::clone(&store), config.store.path.clone(), interval);
    }

    #[cfg(unix)]
    spawn_sighup_reload(Arc::clone(&store), config.store.path.clone());

    let validator = KeyValidator::new(store).with_max_candidates(config.validator.max_candidates);
    let app = build_router(AppState::new(validator), config.api.required_scope.as_str())
        .layer(TraceLayer::new_for_http());

    let addr = config.api.socket_addr().with_context(|| {
        format!(
            "invalid bind address {}:{}",
            config.api.host, config.api.port
        )
    })?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind API server")?;

    info!(
        addr = %addr,
        scope = %config.api.required_scope,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    info!("vito shutdown complete");
    Ok(())
}

/// Re-read the credentials file on the blocking pool
async fn reload_credentials(store: &Arc<MemoryCredentialStore>, path: &Path) -> Result<usize> {
    let store = Arc::clone(store);
    let path = path.to_path_buf();

    let count = tokio::task::spawn_blocking(move || store.reload(&path))
        .await
        .context("credential reload task failed")??;
    Ok(count)
}

/// Reload the credentials file on a fixed interval
fn spawn_periodic_reload(store: Arc<MemoryCredentialStore>, path: PathBuf, interval: Duration) {
    info!(interval = ?interval, "periodic credential reload enabled");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = reload_credentials(&store, &path).await {
                error!(error = %e, "failed to reload credentials, keeping previous set");
            }
        }
    });
}

/// Reload the credentials file on SIGHUP
#[cfg(unix)]
fn spawn_sighup_reload(store: Arc<MemoryCredentialStore>, path: PathBuf) {
    tokio::spawn(async move {
        let mut sig = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                error!(error = %e, "failed to install SIGHUP handler");
                return;
            }
        };
        info!("SIGHUP handler installed for credential hot reload");

        while sig.recv().await.is_some() {
            match reload_credentials(&store, &path).await {
                Ok(n) => info!(keys = n, "SIGHUP: reloaded credentials"),
                Err(e) => error!(error = %e, "SIGHUP: failed to reload credentials"),
            }
        }
    });
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_config_explicit_missing() {
        let result = load_config(Some(Path::new("/nonexistent/vito.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_explicit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[api]\nport = 9191\nrequired_scope = \"agents:financial\"\n")
            .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.api.port, 9191);
        assert_eq!(config.api.required_scope, "agents:financial");
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[validator]\nmax_candidates = 0\n").unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }

    const KEYS: &str = include_str!("../../../../configs/keys.example.toml");

    #[tokio::test]
    async fn test_reload_credentials() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEYS.as_bytes()).unwrap();

        let count = reload_credentials(&store, file.path()).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_reload_credentials_missing_file_keeps_store() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEYS.as_bytes()).unwrap();
        reload_credentials(&store, file.path()).await.unwrap();

        let result = reload_credentials(&store, Path::new("/nonexistent/keys.toml")).await;
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }
}
