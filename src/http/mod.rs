//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum transport, request ID, trace span)
//!     → routing::Router (path lookup)
//!     → cors.rs (CORS headers, pre-flight short-circuit)
//!     → endpoint handler
//!     → response.rs (canned bodies) → client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use cors::{Cors, CorsLayer, CorsPolicy};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
