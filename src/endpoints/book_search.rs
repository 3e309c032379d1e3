//! `/book-search`: proxy a title search to the bibliographic API.
//!
//! # Responsibilities
//! - Read the `q` query parameter
//! - Call the configured search endpoint with a bounded timeout
//! - Render one `Title: ...` block per returned document
//!
//! # Design Decisions
//! - The reqwest client carries the timeout, so a slow upstream cannot hold
//!   the serving task forever
//! - Documents without a title are skipped rather than failing the search
//! - Upstream failures map to a fixed 500 body; the cause goes to the log

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::BookSearchConfig;
use crate::http::request::{method_is, query_param};
use crate::http::response;
use crate::routing::{Handler, HandlerError, HandlerFuture};

/// Search response of the bibliographic API. Only titles are used.
#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub docs: Vec<BookDoc>,
}

#[derive(Debug, Deserialize)]
pub struct BookDoc {
    pub title: Option<String>,
}

/// Error type for building a [`BookSearch`].
#[derive(Debug, thiserror::Error)]
pub enum BookSearchError {
    #[error("invalid search endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct BookSearch {
    client: reqwest::Client,
    endpoint: Url,
}

impl BookSearch {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(config: &BookSearchConfig) -> Result<Self, BookSearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = Url::parse(&config.endpoint)?;
        Ok(Self::new(client, endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Titles of every document matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, HandlerError> {
        let results: SearchResults = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(results.docs.into_iter().filter_map(|doc| doc.title).collect())
    }
}

/// Render titles as `Title: <title>` blocks separated by a blank line.
pub fn render_titles(titles: &[String]) -> String {
    titles.iter().map(|t| format!("Title: {t}\n\n")).collect()
}

impl Handler for BookSearch {
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async move {
            if !method_is(&request, &Method::GET) {
                return Ok(response::method_not_allowed("Only GET requests are allowed for book search."));
            }

            let query = match query_param(request.uri(), "q") {
                Some(q) if !q.is_empty() => q,
                _ => {
                    return Ok(response::text(
                        StatusCode::BAD_REQUEST,
                        "Please provide a search query (e.g., /book-search?q=java).",
                    ));
                }
            };

            match self.search(&query).await {
                Ok(titles) => {
                    tracing::debug!(query = %query, results = titles.len(), "Book search completed");
                    Ok(response::text(StatusCode::OK, render_titles(&titles)))
                }
                Err(error) => {
                    tracing::error!(query = %query, error = %error, "Book search upstream failed");
                    Ok(response::text(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error fetching book data.",
                    ))
                }
            }
        })
    }
}
