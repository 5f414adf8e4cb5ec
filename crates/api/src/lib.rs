//! Vito API
//!
//! HTTP integration for API-key authentication.
//!
//! # Overview
//!
//! This crate wires the `vito-auth` validator into Axum: extractors and a
//! scope layer that authenticate requests, and a mapping from validation
//! outcomes to HTTP responses.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use vito_api::{build_router, AppState};
//! use vito_auth::MemoryCredentialStore;
//!
//! let store = Arc::new(MemoryCredentialStore::from_file("keys.toml")?);
//! let state = AppState::from_store(store);
//!
//! let app = build_router(state, "api:read");
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! - `GET /health` - Liveness, no auth
//! - `GET /api/v1/key` - Authenticated key context
//! - `GET /api/v1/key/policy` - Provider/model allow-list check
//!
//! # Status codes
//!
//! | Outcome | Status | `error` |
//! |---------|--------|---------|
//! | No key | 401 | `AUTH_REQUIRED` |
//! | Malformed, unknown or inactive key | 401 | `INVALID_API_KEY` |
//! | Expired key | 401 | `API_KEY_EXPIRED` |
//! | Missing scope | 403 | `INSUFFICIENT_SCOPE` |
//! | Store failure | 503 | `AUTH_UNAVAILABLE` |

pub mod auth;
pub mod routes;
pub mod state;

// Re-exports
pub use auth::{
    ApiKey, AuthenticatedKey, HasKeyValidator, KeyAuthError, RequiredScope, RouterExt,
    authenticate, require_scope,
};
pub use routes::build_router;
pub use state::AppState;
