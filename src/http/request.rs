//! Request identification and query access.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every incoming request
//! - Expose the query string as an ordered list of key/value pairs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and echoed back
//! - Query keys are not unique; lookups return the first occurrence
//! - Pairs are percent-decoded with `application/x-www-form-urlencoded` rules

use axum::http::{HeaderName, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// [`MakeRequestId`] producing random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer, if any.
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
}

/// Whether the request method is `method`, ignoring ASCII case.
///
/// `Method` treats `options` and `OPTIONS` as different extension/standard
/// methods, so a plain `==` would miss lowercase verbs.
pub fn method_is<B>(request: &Request<B>, method: &Method) -> bool {
    request.method().as_str().eq_ignore_ascii_case(method.as_str())
}

/// Query string as ordered, decoded `(key, value)` pairs.
pub fn query_pairs(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// First value of `key` in the query string.
pub fn query_param(uri: &Uri, key: &str) -> Option<String> {
    query_pairs(uri)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}
