//! API server configuration
//!
//! Configuration for the HTTP server that fronts the key validator.

use std::net::SocketAddr;

use serde::Deserialize;

/// API server configuration
///
/// # Example
///
/// ```toml
/// [api]
/// host = "127.0.0.1"           # default
/// port = 8080                  # default
/// required_scope = "api:read"  # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiServerConfig {
    /// Host to bind to
    /// Default: "127.0.0.1"
    pub host: String,

    /// Port to listen on
    /// Default: 8080
    pub port: u16,

    /// Scope a key must hold to reach the protected routes
    /// Default: "api:read"
    pub required_scope: String,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            required_scope: "api:read".to_string(),
        }
    }
}

impl ApiServerConfig {
    /// Parse `host:port` into a socket address
    ///
    /// Returns `None` when the host is not an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        host.parse().ok().map(|ip| SocketAddr::new(ip, self.port))
    }
}
