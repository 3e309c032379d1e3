//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy applied to every route.
    pub cors: CorsConfig,

    /// File upload endpoint settings.
    pub uploads: UploadConfig,

    /// Credential check endpoint settings.
    pub login: LoginConfig,

    /// External book search settings.
    pub book_search: BookSearchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allow_origin: String,

    /// Methods listed in `Access-Control-Allow-Methods`, joined with ", ".
    pub allow_methods: Vec<String>,

    /// Headers listed in `Access-Control-Allow-Headers`, joined with ",".
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: vec!["GET".into(), "POST".into(), "OPTIONS".into()],
            allow_headers: vec!["Content-Type".into(), "Authorization".into()],
        }
    }
}

/// Upload endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are written to (created at startup).
    pub directory: String,

    /// File name used when the client does not send one.
    pub default_file_name: String,

    /// Largest accepted request body, in bytes.
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "uploads".to_string(),
            default_file_name: "uploaded_file".to_string(),
            max_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Credentials accepted by the login endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginConfig {
    pub username: String,
    pub password: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            // WARNING: placeholder credentials, override them in the config file.
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Book search proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BookSearchConfig {
    /// Search endpoint of the bibliographic API.
    pub endpoint: String,

    /// Total timeout for one upstream call, in seconds.
    pub timeout_secs: u64,
}

impl Default for BookSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openlibrary.org/search.json".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
