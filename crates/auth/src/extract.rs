//! Raw key extraction from request headers
//!
//! Two carriers are supported, checked in order:
//!
//! 1. `Authorization: Bearer <key>`
//! 2. `x-api-key: <key>`
//!
//! A missing key is not an error; callers treat it as an unauthenticated
//! request.

use http::HeaderMap;
use http::header::AUTHORIZATION;

/// Header carrying a bare API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Largest key accepted from a header (8KB)
pub const MAX_KEY_SIZE: usize = 8 * 1024;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw API key from request headers
///
/// `Authorization` wins when it carries a bearer token. Any other
/// `Authorization` scheme is ignored and `x-api-key` is consulted instead.
///
/// # Example
///
/// ```
/// use http::HeaderMap;
/// use vito_auth::extract_api_key;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-api-key", "vito_test_abc123def456".parse().unwrap());
/// assert_eq!(extract_api_key(&headers).as_deref(), Some("vito_test_abc123def456"));
/// ```
pub fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    extract_from_bearer(headers)
        .or_else(|| extract_from_api_key_header(headers))
        .map(str::to_string)
}

fn extract_from_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?;

    // "Bearer " = 7 chars
    if value.len() > MAX_KEY_SIZE + BEARER_PREFIX.len() {
        return None;
    }

    let token = value.to_str().ok()?.strip_prefix(BEARER_PREFIX)?.trim();
    non_empty(token)
}

fn extract_from_api_key_header(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(API_KEY_HEADER)?;

    if value.len() > MAX_KEY_SIZE {
        return None;
    }

    non_empty(value.to_str().ok()?.trim())
}

fn non_empty(token: &str) -> Option<&str> {
    if token.is_empty() || token.len() > MAX_KEY_SIZE {
        None
    } else {
        Some(token)
    }
}
