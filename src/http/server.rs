//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app that feeds every request into the service [`Router`]
//! - Wire up middleware (tracing, request ID)
//! - Serve on a bound listener until shutdown
//! - Record per-request metrics
//!
//! # Design Decisions
//! - Axum only provides the transport: its fallback hands every request,
//!   whatever the request target (`*` included), to our own router, so path
//!   selection stays in one place
//! - No request timeout layer; slow handlers bound their own outbound calls

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::Response,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::observability::metrics::{self, UNMATCHED_ROUTE};
use crate::routing::Router;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
}

/// HTTP server for the API service.
pub struct HttpServer {
    app: axum::Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server around a fully registered `router`.
    pub fn new(config: ServiceConfig, router: Router) -> Self {
        let state = AppState {
            router: Arc::new(router),
        };
        let app = Self::build_app(state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    fn build_app(state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch_request)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
    }

    /// The Axum app, for driving the server in-process (e.g. with `oneshot`).
    pub fn into_app(self) -> axum::Router {
        self.app
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the server, accepting connections on `listener` until
    /// `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all Axum handler: hand the request to the service router.
async fn dispatch_request(State(state): State<AppState>, request: Request) -> Response<Body> {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request_id(&request).unwrap_or("unknown").to_owned();

    tracing::debug!(request_id = %request_id, method = %method, path = %path, "Dispatching request");

    let route = state.router.matched_route(&path).unwrap_or(UNMATCHED_ROUTE);

    let response = state.router.dispatch(request).await;

    let status = response.status();
    metrics::record_request(metrics::method_label(&method), status.as_u16(), route, start_time);
    tracing::debug!(
        request_id = %request_id,
        status = status.as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
