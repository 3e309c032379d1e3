//! `/system-check`: static status document.

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::routing::{Handler, HandlerFuture};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub status: &'static str,
    pub runtime: &'static str,
    #[serde(rename = "Zenara Book System")]
    pub book_system: &'static str,
    #[serde(rename = "OpenCv Gradle")]
    pub opencv_gradle: &'static str,
    pub version: &'static str,
}

impl SystemStatus {
    pub fn current() -> Self {
        Self {
            status: "OK",
            runtime: "OK",
            book_system: "ON",
            opencv_gradle: "OFF",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCheck;

impl Handler for SystemCheck {
    fn handle(&self, _request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async { Ok(Json(SystemStatus::current()).into_response()) })
    }
}
