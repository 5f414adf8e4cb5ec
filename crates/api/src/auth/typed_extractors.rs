//! Type-safe API-key extractor
//!
//! `ApiKey<R>` authenticates the request and enforces the scope named by the
//! marker type `R` at extraction time, before the handler runs.
//!
//! # Example
//!
//! ```ignore
//! use vito_api::auth::{ApiKey, RequiredScope};
//!
//! pub struct FinancialAgents;
//!
//! impl RequiredScope for FinancialAgents {
//!     const SCOPE: &'static str = "agents:financial";
//! }
//!
//! async fn run_agent(key: ApiKey<FinancialAgents>) -> impl IntoResponse {
//!     format!("tenant {}", key.tenant_id())
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::{AuthenticatedKey, HasKeyValidator, KeyAuthError, authenticate};

/// Trait for scope markers
///
/// Implement this on a unit type to name the scope a handler requires.
pub trait RequiredScope: Send + Sync + 'static {
    /// The scope the key must hold
    const SCOPE: &'static str;
}

/// Scope-checked API-key extractor
pub struct ApiKey<R: RequiredScope> {
    /// The authenticated key
    pub auth: AuthenticatedKey,
    _scope: PhantomData<R>,
}

impl<R: RequiredScope> ApiKey<R> {
    /// The scope this extractor enforced
    pub fn scope(&self) -> &'static str {
        R::SCOPE
    }

    /// Consume the extractor, keeping the key context
    pub fn into_inner(self) -> AuthenticatedKey {
        self.auth
    }
}

impl<R: RequiredScope> Clone for ApiKey<R> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            _scope: PhantomData,
        }
    }
}

impl<R: RequiredScope> fmt::Debug for ApiKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("auth", &self.auth)
            .field("scope", &R::SCOPE)
            .finish()
    }
}

impl<R: RequiredScope> std::ops::Deref for ApiKey<R> {
    type Target = AuthenticatedKey;

    fn deref(&self) -> &Self::Target {
        &self.auth
    }
}

impl<S, R> FromRequestParts<S> for ApiKey<R>
where
    S: HasKeyValidator + Send + Sync,
    R: RequiredScope,
{
    type Rejection = KeyAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // A scope layer may already have authenticated this request
        if let Some(existing) = parts.extensions.get::<AuthenticatedKey>()
            && existing.has_scope(R::SCOPE)
        {
            return Ok(ApiKey {
                auth: existing.clone(),
                _scope: PhantomData,
            });
        }

        let auth = authenticate(&parts.headers, state.key_validator(), R::SCOPE).await?;
        parts.extensions.insert(auth.clone());

        Ok(ApiKey {
            auth,
            _scope: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Request, header::AUTHORIZATION};
    use vito_auth::test_utils::{FailingStore, generate_test_key, record_for_key};
    use vito_auth::{KeyValidator, MemoryCredentialStore};

    use super::*;

    struct TestState {
        validator: KeyValidator,
    }

    impl HasKeyValidator for TestState {
        fn key_validator(&self) -> &KeyValidator {
            &self.validator
        }
    }

    struct Financial;

    impl RequiredScope for Financial {
        const SCOPE: &'static str = "agents:financial";
    }

    fn state_with(key: &str, scopes: &[&str]) -> TestState {
        let store = MemoryCredentialStore::new();
        store.insert(record_for_key("key-1", "tenant-1", key, scopes));
        TestState {
            validator: KeyValidator::new(Arc::new(store)),
        }
    }

    fn parts_with_bearer(key: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {}", key))
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn test_extracts_key_with_scope() {
        let key = generate_test_key("test");
        let state = state_with(&key, &["agents:financial"]);
        let mut parts = parts_with_bearer(&key);

        let api_key = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(api_key.tenant_id(), "tenant-1");
        assert_eq!(api_key.scope(), "agents:financial");
        assert!(parts.extensions.get::<AuthenticatedKey>().is_some());
    }

    #[tokio::test]
    async fn test_rejects_missing_scope() {
        let key = generate_test_key("test");
        let state = state_with(&key, &["voice:synthesis"]);
        let mut parts = parts_with_bearer(&key);

        let err = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            KeyAuthError::InsufficientScope("agents:financial".into())
        );
    }

    #[tokio::test]
    async fn test_malformed_key_rejected_before_lookup() {
        // A failing store would yield StoreUnavailable if it were queried
        let state = TestState {
            validator: KeyValidator::new(Arc::new(FailingStore)),
        };
        let mut parts = parts_with_bearer("not-a-vito-key-at-all");

        let err = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err, KeyAuthError::InvalidKey);
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let state = TestState {
            validator: KeyValidator::new(Arc::new(FailingStore)),
        };
        let mut parts = parts_with_bearer(&generate_test_key("test"));

        let err = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err, KeyAuthError::StoreUnavailable);
    }

    #[tokio::test]
    async fn test_reuses_layer_authentication() {
        let key = generate_test_key("test");
        // The store does not know `key`, so a fresh lookup would be denied
        let state = state_with(&generate_test_key("other"), &[]);
        let mut parts = parts_with_bearer(&key);

        let existing = AuthenticatedKey::new(
            record_for_key("key-9", "tenant-9", &key, &["agents:financial"]).into(),
        );
        parts.extensions.insert(existing.clone());

        let api_key = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(api_key.correlation_id, existing.correlation_id);
        assert_eq!(api_key.key_id(), "key-9");
    }

    #[tokio::test]
    async fn test_debug_without_marker_debug() {
        // `Financial` has no Debug impl of its own
        let key = generate_test_key("test");
        let state = state_with(&key, &["agents:financial"]);
        let mut parts = parts_with_bearer(&key);

        let api_key = ApiKey::<Financial>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        let rendered = format!("{:?}", api_key);
        assert!(rendered.starts_with("ApiKey"));
        assert!(rendered.contains("agents:financial"));
        assert!(rendered.contains("tenant-1"));
    }
}
