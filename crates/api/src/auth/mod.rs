//! API-key authentication and scope authorization
//!
//! # Usage
//!
//! ## Type-safe extractor
//!
//! ```ignore
//! use vito_api::auth::{ApiKey, RequiredScope};
//!
//! struct VoiceSynthesis;
//! impl RequiredScope for VoiceSynthesis {
//!     const SCOPE: &'static str = "voice:synthesis";
//! }
//!
//! async fn synthesize(key: ApiKey<VoiceSynthesis>) -> impl IntoResponse { }
//! ```
//!
//! ## Scope layer
//!
//! ```ignore
//! use vito_api::auth::{AuthenticatedKey, RouterExt};
//!
//! Router::new()
//!     .route("/key", get(|key: AuthenticatedKey| async move { Json(key) }))
//!     .with_scope(validator, "api:read")
//! ```

pub mod extractors;
pub mod middleware;
pub mod typed_extractors;

pub use extractors::{RequireScopeLayer, RequireScopeService, RouterExt, require_scope};
pub use middleware::{AuthenticatedKey, HasKeyValidator, KeyAuthError, authenticate};
pub use typed_extractors::{ApiKey, RequiredScope};

// Re-export core types from vito-auth
pub use vito_auth::{KeyValidator, ValidatedKey};
