//! The service's endpoints and their registration.
//!
//! # Routes
//! - `/`             welcome text
//! - `/upload`       POST, store the body in the upload directory
//! - `/system-check` JSON status document
//! - `/login`        POST, form-encoded credential check
//! - `/book-search`  GET, proxy to the bibliographic API
//!
//! Every route and the NotFound fallback are wrapped in the same CORS
//! decorator, so pre-flight requests to any path answer 204.

pub mod book_search;
pub mod login;
pub mod system_check;
pub mod upload;
pub mod welcome;

pub use book_search::BookSearch;
pub use login::Login;
pub use system_check::SystemCheck;
pub use upload::Upload;
pub use welcome::Welcome;

use crate::config::ServiceConfig;
use crate::http::cors::CorsLayer;
use crate::routing::{NotFound, Router};

pub const ROOT: &str = "/";
pub const UPLOAD: &str = "/upload";
pub const SYSTEM_CHECK: &str = "/system-check";
pub const LOGIN: &str = "/login";
pub const BOOK_SEARCH: &str = "/book-search";

/// Build the route table for the whole service.
pub fn routes(config: &ServiceConfig, cors: &CorsLayer, book_search: BookSearch) -> Router {
    Router::new()
        .route(ROOT, cors.wrap(Welcome))
        .route(UPLOAD, cors.wrap(Upload::from_config(&config.uploads)))
        .route(SYSTEM_CHECK, cors.wrap(SystemCheck))
        .route(LOGIN, cors.wrap(Login::from_config(&config.login)))
        .route(BOOK_SEARCH, cors.wrap(book_search))
        .fallback(cors.wrap(NotFound))
}
