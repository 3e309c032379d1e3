//! `/login`: form-encoded credential check.
//!
//! Only the configured username/password pair is accepted. This endpoint is
//! a stand-in, not an authentication system.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use futures_util::StreamExt;

use crate::config::LoginConfig;
use crate::http::request::method_is;
use crate::http::response;
use crate::routing::{Handler, HandlerError, HandlerFuture};

/// Largest login form accepted.
const MAX_FORM_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct Login {
    username: String,
    password: String,
}

impl Login {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &LoginConfig) -> Self {
        Self::new(&config.username, &config.password)
    }

    fn authenticate(&self, form: &HashMap<String, String>) -> bool {
        match (form.get("username"), form.get("password")) {
            (Some(username), Some(password)) => {
                *username == self.username && *password == self.password
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read the whole form body, or `None` once it grows past `limit` bytes.
async fn read_form(body: Body, limit: usize) -> Result<Option<Vec<u8>>, HandlerError> {
    let mut stream = body.into_data_stream();
    let mut form = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if form.len() + chunk.len() > limit {
            return Ok(None);
        }
        form.extend_from_slice(&chunk);
    }
    Ok(Some(form))
}

/// Decode an urlencoded form. Pairs without `=` are skipped and later keys
/// override earlier ones.
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    body.split(|b| *b == b'&')
        .filter(|pair| pair.contains(&b'='))
        .flat_map(url::form_urlencoded::parse)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

impl Handler for Login {
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async move {
            if !method_is(&request, &Method::POST) {
                return Ok(response::method_not_allowed("Only POST requests are allowed for login."));
            }

            let Some(body) = read_form(request.into_body(), MAX_FORM_BYTES).await? else {
                tracing::warn!(max_bytes = MAX_FORM_BYTES, "Login form too large");
                return Ok(response::text(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Login form exceeds the size limit.",
                ));
            };
            let form = parse_form(&body);

            if self.authenticate(&form) {
                tracing::info!(username = %self.username, "Login accepted");
                Ok(response::text(StatusCode::OK, "Login successful!"))
            } else {
                tracing::warn!(
                    username = form.get("username").map(String::as_str).unwrap_or("<missing>"),
                    "Login rejected"
                );
                Ok(response::text(StatusCode::UNAUTHORIZED, "Invalid username or password."))
            }
        })
    }
}
