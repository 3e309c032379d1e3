//! Cross-origin decoration for handlers.
//!
//! # Responsibilities
//! - Render the process-wide CORS policy into response headers once
//! - Answer pre-flight (`OPTIONS`) requests with 204 without touching the
//!   wrapped handler
//! - Layer the inner handler's headers on top of the CORS headers
//!
//! # Design Decisions
//! - The decorator is a plain struct holding its inner handler, and is itself
//!   a [`Handler`], so decorators chain
//! - One policy for every route; no per-route overrides
//! - Header values are rendered once, exactly as configured (case included)

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode};

use crate::config::CorsConfig;
use crate::http::request::method_is;
use crate::routing::{respond, Handler, HandlerFuture};

/// Error type for building a [`CorsPolicy`].
#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    /// A configured value cannot be sent as an HTTP header value.
    #[error("invalid CORS header value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// A configured method is not a valid HTTP method token.
    #[error("invalid HTTP method in CORS policy: {0:?}")]
    InvalidMethod(String),

    /// A configured request header is not a valid header name.
    #[error("invalid header name in CORS policy: {0:?}")]
    InvalidHeaderName(String),
}

/// The immutable cross-origin policy shared by every route.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: Vec<Method>,
    allow_methods_value: HeaderValue,
    allow_headers_value: HeaderValue,
}

impl CorsPolicy {
    /// Build a policy from configuration, validating every entry.
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsError> {
        let allow_origin = header_value("allow_origin", &config.allow_origin)?;

        let allow_methods = config
            .allow_methods
            .iter()
            .map(|m| Method::from_bytes(m.as_bytes()).map_err(|_| CorsError::InvalidMethod(m.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        for name in &config.allow_headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| CorsError::InvalidHeaderName(name.clone()))?;
        }

        Ok(Self {
            allow_origin,
            allow_methods_value: header_value("allow_methods", &config.allow_methods.join(", "))?,
            allow_headers_value: header_value("allow_headers", &config.allow_headers.join(","))?,
            allow_methods,
        })
    }

    /// Methods advertised in `Access-Control-Allow-Methods`.
    pub fn allow_methods(&self) -> &[Method] {
        &self.allow_methods
    }

    /// The three CORS headers, freshly allocated.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods_value.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers_value.clone());
        headers
    }

    /// Put the CORS headers underneath whatever `response` already carries.
    ///
    /// A header the inner handler set itself replaces the CORS value of the
    /// same name; all other CORS headers stay.
    pub fn apply(&self, response: Response<Body>) -> Response<Body> {
        let (mut parts, body) = response.into_parts();
        let inner = std::mem::replace(&mut parts.headers, self.headers());
        parts.headers.extend(inner);
        Response::from_parts(parts, body)
    }

    /// The 204 answer to a pre-flight request.
    pub fn preflight(&self) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.headers_mut() = self.headers();
        response
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: vec![Method::GET, Method::POST, Method::OPTIONS],
            allow_methods_value: HeaderValue::from_static("GET, POST, OPTIONS"),
            allow_headers_value: HeaderValue::from_static("Content-Type,Authorization"),
        }
    }
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue, CorsError> {
    HeaderValue::from_str(value).map_err(|_| CorsError::InvalidValue {
        field,
        value: value.to_owned(),
    })
}

/// True for the pre-flight verb, compared case-insensitively.
pub fn is_preflight<B>(request: &Request<B>) -> bool {
    method_is(request, &Method::OPTIONS)
}

/// Decorator adding CORS headers to every response of `H`.
pub struct Cors<H> {
    policy: Arc<CorsPolicy>,
    inner: H,
}

impl<H: Handler> Cors<H> {
    /// Wrap `inner` with `policy`.
    pub fn new(policy: Arc<CorsPolicy>, inner: H) -> Self {
        Self { policy, inner }
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Handler> Handler for Cors<H> {
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async move {
            if is_preflight(&request) {
                tracing::trace!(path = %request.uri().path(), "Answering pre-flight");
                return Ok(self.policy.preflight());
            }

            // Failures of the inner handler are turned into a 500 here, so the
            // error response still carries the CORS headers.
            let response = respond(&self.inner, request).await;
            Ok(self.policy.apply(response))
        })
    }
}

/// Builds [`Cors`] decorators that share one policy.
#[derive(Debug, Clone)]
pub struct CorsLayer {
    policy: Arc<CorsPolicy>,
}

impl CorsLayer {
    pub fn new(policy: CorsPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Wrap `inner` with the shared policy.
    pub fn wrap<H: Handler>(&self, inner: H) -> Cors<H> {
        Cors::new(Arc::clone(&self.policy), inner)
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }
}
