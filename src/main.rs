//! Zenara API service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum transport ──▶ Router ──▶ CORS decorator ──▶ endpoint
//!                     (request id,        (exact    (headers, OPTIONS     handler
//!                      trace span)         path)     → 204)
//!     Client Response
//!     ◀────────────── one response per request (handler failures → 500)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use zenara_api::config::validation::validate_config;
use zenara_api::config::{self, ConfigError, ServiceConfig};
use zenara_api::lifecycle::{signals, startup, Shutdown, StartupError};
use zenara_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "zenara-api")]
#[command(about = "Zenara API server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply without it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<ServiceConfig, StartupError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("zenara-api: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("zenara-api: failed to initialise logging: {e}");
    }

    tracing::info!("zenara-api v{} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upload_dir = %config.uploads.directory,
        book_search = %config.book_search.endpoint,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    startup::prepare_upload_dir(&config).await?;
    let server = startup::build_server(config)?;
    let listener = startup::bind(server.config()).await?;

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_termination(shutdown.clone()));

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
