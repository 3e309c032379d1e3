//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store registered handlers keyed by path
//! - Look up the handler for a request path
//! - Fall back to a NotFound handler for unregistered paths
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks on dispatch)
//! - Prefix lookup on `/` segment boundaries, longest key wins; each attempt is
//!   a HashMap lookup, at most two per path segment
//! - The root key `/` only matches `/`, so uncovered paths still reach the
//!   fallback
//! - Registering the same path twice is a start-up bug: `route` panics,
//!   `try_route` reports it
//! - Every dispatch goes through the failure boundary, so a response is
//!   always produced

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;

use super::handler::{respond, Handler, HandlerFuture};

/// Error type for route registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The path already has a handler.
    #[error("path `{0}` is already registered")]
    Duplicate(String),

    /// The path does not start with `/`.
    #[error("path `{0}` must start with `/`")]
    InvalidPath(String),
}

/// Handler used for paths nobody registered: plain 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        tracing::debug!(path = %request.uri().path(), "No route matched");
        Box::pin(async { Ok((StatusCode::NOT_FOUND, "Not Found").into_response()) })
    }
}

/// Fixed mapping from request path to handler.
pub struct Router {
    routes: HashMap<String, Arc<dyn Handler>>,
    fallback: Arc<dyn Handler>,
}

impl Router {
    /// Create an empty router whose fallback answers 404.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: Arc::new(NotFound),
        }
    }

    /// Register `handler` for `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` is already registered or does not start with `/`.
    /// Routes are assembled once at start-up, so this is a programming error.
    #[track_caller]
    pub fn route(self, path: &str, handler: impl Handler) -> Self {
        match self.try_route(path, handler) {
            Ok(router) => router,
            Err(error) => panic!("invalid route registration: {error}"),
        }
    }

    /// Register `handler` for `path`, reporting conflicts instead of panicking.
    pub fn try_route(mut self, path: &str, handler: impl Handler) -> Result<Self, RouterError> {
        if !path.starts_with('/') {
            return Err(RouterError::InvalidPath(path.to_owned()));
        }
        if self.routes.contains_key(path) {
            return Err(RouterError::Duplicate(path.to_owned()));
        }
        self.routes.insert(path.to_owned(), Arc::new(handler));
        Ok(self)
    }

    /// Replace the handler used when no route matches.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Arc::new(handler);
        self
    }

    /// Whether `path` is exactly a registered key.
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// The registered key that `path` dispatches to, if any.
    pub fn matched_route(&self, path: &str) -> Option<&str> {
        self.lookup(path).map(|(key, _)| key)
    }

    /// Longest registered prefix of `path` ending on a segment boundary.
    ///
    /// `/a/b/c` tries `/a/b/c`, `/a/b/`, `/a/b`, `/a/`, `/a`. The root key is
    /// only reached by the exact match.
    fn lookup(&self, path: &str) -> Option<(&str, &Arc<dyn Handler>)> {
        if let Some((key, handler)) = self.routes.get_key_value(path) {
            return Some((key.as_str(), handler));
        }

        let mut end = path.len();
        while let Some(slash) = path[..end].rfind('/') {
            if slash == 0 {
                break;
            }
            let found = self
                .routes
                .get_key_value(&path[..=slash])
                .or_else(|| self.routes.get_key_value(&path[..slash]));
            if let Some((key, handler)) = found {
                return Some((key.as_str(), handler));
            }
            end = slash;
        }
        None
    }

    /// Registered paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Number of registered routes (the fallback is not counted).
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when nothing but the fallback is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch `request` to exactly one handler and return its response.
    pub async fn dispatch(&self, request: Request<Body>) -> Response<Body> {
        let handler = self
            .lookup(request.uri().path())
            .map(|(_, handler)| handler)
            .unwrap_or(&self.fallback);

        respond(handler.as_ref(), request).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&str> = self.paths().collect();
        paths.sort_unstable();
        f.debug_struct("Router").field("routes", &paths).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HandlerError;
    use axum::body::to_bytes;

    fn ok(body: &'static str) -> impl Handler {
        move |_req: Request<Body>| async move { Ok::<_, HandlerError>(body.into_response()) }
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn dispatches_by_exact_path() {
        let router = Router::new().route("/a", ok("a")).route("/b", ok("b"));

        assert_eq!(body_text(router.dispatch(get("/a")).await).await, "a");
        assert_eq!(body_text(router.dispatch(get("/b?x=1")).await).await, "b");
    }

    #[tokio::test]
    async fn unregistered_path_is_404() {
        let router = Router::new().route("/a", ok("a"));

        for path in ["/b", "/ab", "/A", "*"] {
            let response = router.dispatch(get(path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {path}");
        }
    }

    #[tokio::test]
    async fn child_paths_reach_their_prefix() {
        let router = Router::new().route("/a", ok("a"));

        for path in ["/a/", "/a/child", "/a/child/leaf?q=1"] {
            assert_eq!(body_text(router.dispatch(get(path)).await).await, "a", "path {path}");
        }
        assert_eq!(router.matched_route("/a/child"), Some("/a"));
    }

    #[tokio::test]
    async fn longest_prefix_wins() {
        let router = Router::new()
            .route("/a", ok("a"))
            .route("/a/b", ok("ab"))
            .route("/a/b/", ok("ab-slash"));

        assert_eq!(body_text(router.dispatch(get("/a/b")).await).await, "ab");
        assert_eq!(body_text(router.dispatch(get("/a/b/c")).await).await, "ab-slash");
        assert_eq!(body_text(router.dispatch(get("/a/bc")).await).await, "a");
    }

    #[tokio::test]
    async fn root_matches_only_itself() {
        let router = Router::new().route("/", ok("root")).route("/a", ok("a"));

        assert_eq!(body_text(router.dispatch(get("/")).await).await, "root");
        assert_eq!(router.dispatch(get("/elsewhere")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(router.matched_route("/elsewhere/deeper"), None);
        assert_eq!(router.matched_route("/a/x"), Some("/a"));
    }

    #[tokio::test]
    async fn custom_fallback_is_used() {
        let router = Router::new().fallback(ok("fallback"));

        assert_eq!(body_text(router.dispatch(get("/missing")).await).await, "fallback");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let result = Router::new().route("/a", ok("a")).try_route("/a", ok("again"));
        assert_eq!(result.unwrap_err(), RouterError::Duplicate("/a".into()));
    }

    #[test]
    fn relative_path_is_rejected() {
        let result = Router::new().try_route("upload", ok("x"));
        assert_eq!(result.unwrap_err(), RouterError::InvalidPath("upload".into()));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn route_panics_on_duplicate() {
        let _ = Router::new().route("/a", ok("a")).route("/a", ok("b"));
    }

    #[test]
    fn debug_lists_sorted_paths() {
        let router = Router::new().route("/z", ok("z")).route("/a", ok("a"));
        assert_eq!(format!("{router:?}"), r#"Router { routes: ["/a", "/z"] }"#);
        assert_eq!(router.len(), 2);
        assert!(router.contains("/z"));
        assert!(!router.is_empty());
    }
}
