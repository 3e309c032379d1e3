//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a ready-to-serve [`HttpServer`]
//! - Create the upload directory
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and reported to the operator
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::config::{ConfigError, ServiceConfig};
use crate::endpoints::book_search::{BookSearch, BookSearchError};
use crate::endpoints::routes;
use crate::http::cors::{CorsError, CorsLayer, CorsPolicy};
use crate::http::HttpServer;

/// Anything that stops the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CORS policy error: {0}")]
    Cors(#[from] CorsError),

    #[error("book search setup failed: {0}")]
    BookSearch(#[from] BookSearchError),

    #[error("failed to create upload directory {path}: {source}")]
    UploadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },

    #[error("server stopped with an I/O error: {0}")]
    Serve(std::io::Error),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Build the server (router, CORS policy, endpoints) from `config`.
pub fn build_server(config: ServiceConfig) -> Result<HttpServer, StartupError> {
    let cors = CorsLayer::new(CorsPolicy::from_config(&config.cors)?);
    tracing::info!(
        allow_origin = %config.cors.allow_origin,
        allow_methods = ?cors.policy().allow_methods(),
        "CORS policy loaded"
    );
    let book_search = BookSearch::from_config(&config.book_search)?;
    let router = routes(&config, &cors, book_search);

    tracing::info!(routes = router.len(), "Route table built");
    Ok(HttpServer::new(config, router))
}

/// Create the upload directory if it does not exist yet.
pub async fn prepare_upload_dir(config: &ServiceConfig) -> Result<(), StartupError> {
    let path = PathBuf::from(&config.uploads.directory);
    tokio::fs::create_dir_all(&path)
        .await
        .map_err(|source| StartupError::UploadDir { path, source })
}

/// Bind the listener on the configured address.
pub async fn bind(config: &ServiceConfig) -> Result<TcpListener, StartupError> {
    let address: SocketAddr =
        config
            .listener
            .bind_address
            .parse()
            .map_err(|source| StartupError::Address {
                address: config.listener.bind_address.clone(),
                source,
            })?;

    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    tracing::info!(address = %listener.local_addr().unwrap_or(address), "Listening for connections");
    Ok(listener)
}
