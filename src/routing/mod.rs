//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers, body)
//!     → router.rs (exact path lookup, NotFound fallback)
//!     → handler.rs (failure boundary: errors and panics become 500)
//!     → registered Handler (usually wrapped in the CORS decorator)
//!     → Response, produced exactly once
//!
//! Route Registration (at startup):
//!     Router::new()
//!     → route(path, handler) for every endpoint
//!     → fallback(handler) for unmatched paths
//!     → Freeze behind Arc, shared by every connection
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Exact path matching; query strings never take part in routing
//! - Deterministic: same path always reaches the same handler

pub mod handler;
pub mod router;

pub use handler::{respond, Handler, HandlerError, HandlerFuture, HandlerResult};
pub use router::{NotFound, Router, RouterError};
