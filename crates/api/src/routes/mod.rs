//! API routes
//!
//! Public operations routes plus scope-gated key routes.

pub mod key;
pub mod ops;

use std::sync::Arc;

use axum::Router;

use crate::auth::RouterExt;
use crate::state::AppState;

/// Build the complete API router
///
/// `/health` is public. Everything under `/api/v1/key` requires a key holding
/// `scope`.
pub fn build_router(state: AppState, scope: impl Into<Arc<str>>) -> Router {
    let key_routes = key::routes().with_scope(state.validator.clone(), scope);

    Router::new()
        .merge(ops::routes())
        .nest("/api/v1/key", key_routes)
        .with_state(state)
}
