//! Canned responses shared by the core and the endpoints.

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;

/// The generic failure response. Never carries error detail.
pub fn internal_error() -> Response<Body> {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Plain-text response with an explicit status.
pub fn text(status: StatusCode, body: impl Into<String>) -> Response<Body> {
    (status, body.into()).into_response()
}

/// 405 with an explanation of what the endpoint accepts.
pub fn method_not_allowed(message: &'static str) -> Response<Body> {
    (StatusCode::METHOD_NOT_ALLOWED, message).into_response()
}
