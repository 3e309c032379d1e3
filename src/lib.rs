//! Zenara API service library.
//!
//! A small HTTP service whose endpoints share one cross-origin policy.
//! Requests flow through a fixed route table into handlers wrapped by a CORS
//! decorator; handler failures are contained per request.

pub mod config;
pub mod endpoints;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServiceConfig;
pub use http::{CorsLayer, CorsPolicy, HttpServer};
pub use lifecycle::{Shutdown, StartupError};
pub use routing::{Handler, HandlerError, Router};
