//! Key introspection routes
//!
//! Every route here sits behind the scope layer installed by
//! [`build_router`](super::build_router).

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use vito_auth::PolicyDenial;

use crate::auth::AuthenticatedKey;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Query for a provider/model policy check
#[derive(Debug, Default, Deserialize)]
pub struct PolicyQuery {
    /// Provider to check against the allow-list
    pub provider: Option<String>,
    /// Model to check against the allow-list
    pub model: Option<String>,
}

/// Successful policy check
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Rejection for a provider/model outside the key's allow-lists
#[derive(Debug)]
pub struct PolicyRejection(pub PolicyDenial);

impl IntoResponse for PolicyRejection {
    fn into_response(self) -> Response {
        let code = match self.0 {
            PolicyDenial::ProviderNotAllowed(_) => "PROVIDER_NOT_ALLOWED",
            PolicyDenial::ModelNotAllowed(_) => "MODEL_NOT_ALLOWED",
        };
        let body = serde_json::json!({
            "error": code,
            "message": self.0.to_string(),
        });

        (StatusCode::FORBIDDEN, Json(body)).into_response()
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Key routes, mounted under `/api/v1/key`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(current_key))
        .route("/policy", get(check_policy))
}

/// GET /api/v1/key
///
/// Returns the authenticated key context.
async fn current_key(key: AuthenticatedKey) -> Json<AuthenticatedKey> {
    Json(key)
}

/// GET /api/v1/key/policy?provider=..&model=..
///
/// Checks the key's provider and model allow-lists. Provider is checked first.
async fn check_policy(
    key: AuthenticatedKey,
    Query(query): Query<PolicyQuery>,
) -> Result<Json<PolicyResponse>, PolicyRejection> {
    if let Some(ref provider) = query.provider {
        key.check_provider(provider).map_err(PolicyRejection)?;
    }
    if let Some(ref model) = query.model {
        key.check_model(model).map_err(PolicyRejection)?;
    }

    Ok(Json(PolicyResponse {
        allowed: true,
        provider: query.provider,
        model: query.model,
    }))
}
