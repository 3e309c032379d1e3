//! The handler capability and the failure boundary around it.
//!
//! # Responsibilities
//! - Define the single operation every endpoint implements
//! - Convert handler failures (error results and panics) into a generic 500
//!
//! # Design Decisions
//! - Handlers return boxed futures so they can live behind `dyn Handler`
//! - Any `Fn(Request) -> Future` closure is a handler (used heavily in tests)
//! - The 500 body never carries error detail; the detail goes to the log

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::response;

/// Outcome of a single handler invocation.
pub type HandlerResult = Result<Response<Body>, HandlerError>;

/// Future returned by [`Handler::handle`].
pub type HandlerFuture<'a> = BoxFuture<'a, HandlerResult>;

/// Failure raised by a handler while producing its response.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Local file or socket I/O failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound HTTP call failed (connect, timeout or non-2xx status).
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    /// Anything else a handler wants to surface as an internal failure.
    #[error("{0}")]
    Internal(String),
}

/// A capability that turns one request into one response.
///
/// The request body is handed over unconsumed and the handler owns it, so it
/// can be read at most once. Returning the response is the only way to
/// answer, so status and headers are written exactly once.
pub trait Handler: Send + Sync + 'static {
    /// Handle a single request.
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin((self)(request))
    }
}

/// Invoke `handler` and always come back with a response.
///
/// Error results and panics are logged and replaced by a bare 500. This is
/// the boundary that keeps one failing exchange from leaving its connection
/// unanswered or touching any other request.
pub async fn respond<H>(handler: &H, request: Request<Body>) -> Response<Body>
where
    H: Handler + ?Sized,
{
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let outcome = AssertUnwindSafe(async move { handler.handle(request).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            tracing::error!(method = %method, path = %path, error = %error, "Handler failed");
            response::internal_error()
        }
        Err(panic) => {
            tracing::error!(
                method = %method,
                path = %path,
                panic = %panic_message(panic.as_ref()),
                "Handler panicked"
            );
            response::internal_error()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
