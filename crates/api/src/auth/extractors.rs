//! Scope enforcement middleware
//!
//! Provides route-level scope checking with a clean API.
//!
//! # Example
//!
//! ```ignore
//! use vito_api::auth::RouterExt;
//!
//! // Every route below requires a key holding "agents:financial"
//! Router::new()
//!     .route("/agents/run", post(run_agent))
//!     .with_scope(validator, "agents:financial")
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{Router, extract::Request, response::IntoResponse, response::Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use vito_auth::KeyValidator;

use super::middleware::authenticate;

/// Layer that requires a key holding a specific scope
#[derive(Debug, Clone)]
pub struct RequireScopeLayer {
    validator: KeyValidator,
    pub(crate) scope: Arc<str>,
}

impl RequireScopeLayer {
    pub fn new(validator: KeyValidator, scope: impl Into<Arc<str>>) -> Self {
        Self {
            validator,
            scope: scope.into(),
        }
    }
}

impl<S> Layer<S> for RequireScopeLayer {
    type Service = RequireScopeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireScopeService {
            inner,
            validator: self.validator.clone(),
            scope: self.scope.clone(),
        }
    }
}

/// Service that authenticates the key before forwarding the request
///
/// On success the [`AuthenticatedKey`] is inserted into request extensions.
///
/// [`AuthenticatedKey`]: super::AuthenticatedKey
#[derive(Debug, Clone)]
pub struct RequireScopeService<S> {
    inner: S,
    validator: KeyValidator,
    scope: Arc<str>,
}

impl<S> Service<Request> for RequireScopeService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let validator = self.validator.clone();
        let scope = self.scope.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match authenticate(req.headers(), &validator, &scope).await {
                Ok(auth) => {
                    req.extensions_mut().insert(auth);
                    inner.call(req).await
                }
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}

/// Create a scope layer
///
/// # Example
///
/// ```ignore
/// Router::new()
///     .route("/synthesize", post(synthesize))
///     .route_layer(require_scope(validator, "voice:synthesis"))
/// ```
pub fn require_scope(validator: KeyValidator, scope: impl Into<Arc<str>>) -> RequireScopeLayer {
    RequireScopeLayer::new(validator, scope)
}

/// Extension trait for Router with scope helpers
pub trait RouterExt<S> {
    /// Require a key holding `scope` for all routes in this router
    ///
    /// Unmatched paths are not authenticated and still return 404.
    fn with_scope(self, validator: KeyValidator, scope: impl Into<Arc<str>>) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_scope(self, validator: KeyValidator, scope: impl Into<Arc<str>>) -> Self {
        self.route_layer(RequireScopeLayer::new(validator, scope))
    }
}

#[cfg(test)]
mod tests {
    use vito_auth::MemoryCredentialStore;

    use super::*;

    #[test]
    fn test_require_scope_layer() {
        let validator = KeyValidator::new(Arc::new(MemoryCredentialStore::new()));

        let layer = require_scope(validator.clone(), "agents:financial");
        assert_eq!(&*layer.scope, "agents:financial");

        let owned = require_scope(validator, String::from("voice:synthesis"));
        assert_eq!(&*owned.scope, "voice:synthesis");
    }
}
