//! `/`: greeting.

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;

use crate::routing::{Handler, HandlerFuture};

pub const WELCOME_MESSAGE: &str = "Welcome to the Zenara API server!";

/// Answers every method with the welcome text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Welcome;

impl Handler for Welcome {
    fn handle(&self, _request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async { Ok(WELCOME_MESSAGE.into_response()) })
    }
}
