//! `/upload`: stream the request body into the upload directory.
//!
//! # Design Decisions
//! - The body is streamed chunk by chunk, never buffered whole
//! - Only the final path component of a client-supplied name is used
//! - A body over the configured limit gets 413 and the partial file is removed

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::{HeaderMap, HeaderName, Method, Request, StatusCode};
use futures_util::StreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::config::UploadConfig;
use crate::http::request::method_is;
use crate::http::response;
use crate::routing::{Handler, HandlerError, HandlerFuture};

/// Header carrying the client's preferred file name.
pub static X_FILE_NAME: HeaderName = HeaderName::from_static("x-file-name");

#[derive(Debug, Clone)]
pub struct Upload {
    directory: PathBuf,
    default_file_name: String,
    max_bytes: u64,
}

enum Stored {
    Complete(u64),
    TooLarge,
}

impl Upload {
    pub fn new(directory: impl Into<PathBuf>, default_file_name: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            directory: directory.into(),
            default_file_name: default_file_name.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.directory, &config.default_file_name, config.max_bytes)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn store(&self, path: &Path, body: Body) -> Result<Stored, HandlerError> {
        let mut file = File::create(path).await?;
        let mut stream = body.into_data_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                drop(file);
                fs::remove_file(path).await?;
                return Ok(Stored::TooLarge);
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(Stored::Complete(written))
    }
}

impl Handler for Upload {
    fn handle(&self, request: Request<Body>) -> HandlerFuture<'_> {
        Box::pin(async move {
            if !method_is(&request, &Method::POST) {
                return Ok(response::method_not_allowed("Only POST requests are allowed for file uploads."));
            }

            let file_name = file_name_from_headers(request.headers())
                .unwrap_or_else(|| self.default_file_name.clone());
            let path = self.directory.join(&file_name);

            match self.store(&path, request.into_body()).await {
                Ok(Stored::Complete(bytes)) => {
                    tracing::info!(file = %path.display(), bytes, "Upload stored");
                    Ok(response::text(StatusCode::OK, "File uploaded successfully!"))
                }
                Ok(Stored::TooLarge) => {
                    tracing::warn!(file = %path.display(), max_bytes = self.max_bytes, "Upload too large");
                    Ok(response::text(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        "Uploaded file exceeds the size limit.",
                    ))
                }
                Err(error) => {
                    tracing::error!(file = %path.display(), error = %error, "Upload failed");
                    let _ = fs::remove_file(&path).await;
                    Ok(response::text(StatusCode::INTERNAL_SERVER_ERROR, "Error uploading file."))
                }
            }
        })
    }
}

/// File name from `X-File-Name`, else from the `filename` parameter of
/// `Content-Disposition`, reduced to a safe final path component.
pub fn file_name_from_headers(headers: &HeaderMap) -> Option<String> {
    let explicit = headers
        .get(&X_FILE_NAME)
        .and_then(|v| v.to_str().ok())
        .and_then(sanitize_file_name);

    explicit.or_else(|| {
        headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .and_then(sanitize_file_name)
    })
}

fn disposition_file_name(value: &str) -> Option<&str> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
}

fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        _ => Some(name.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn post(body: Vec<u8>, name: Option<&'static str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/upload");
        if let Some(name) = name {
            builder = builder.header(&X_FILE_NAME, name);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[test]
    fn file_names_are_reduced_to_last_component() {
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\Users\\me\\cv.pdf").as_deref(), Some("cv.pdf"));
        assert_eq!(sanitize_file_name("dir/.."), None);
        assert_eq!(sanitize_file_name("  "), None);
    }

    #[test]
    fn content_disposition_is_a_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"notes.txt\""),
        );
        assert_eq!(file_name_from_headers(&headers).as_deref(), Some("notes.txt"));

        headers.insert(&X_FILE_NAME, HeaderValue::from_static("chosen.bin"));
        assert_eq!(file_name_from_headers(&headers).as_deref(), Some("chosen.bin"));
    }

    #[tokio::test]
    async fn stores_body_under_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload::new(dir.path(), "uploaded_file", 1024);

        let response = upload.handle(post(b"hello".to_vec(), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read(dir.path().join("uploaded_file")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload::new(dir.path(), "uploaded_file", 4);

        let response = upload.handle(post(vec![0; 16], Some("big.bin"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!dir.path().join("big.bin").exists());
    }

    #[tokio::test]
    async fn limit_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload::new(dir.path(), "uploaded_file", 5);

        let response = upload.handle(post(b"12345".to_vec(), Some("exact.bin"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read(dir.path().join("exact.bin")).unwrap(), b"12345");

        let response = upload.handle(post(b"123456".to_vec(), Some("over.bin"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!dir.path().join("over.bin").exists());
    }

    #[tokio::test]
    async fn missing_directory_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload::new(dir.path().join("gone"), "uploaded_file", 1024);

        let response = upload.handle(post(b"x".to_vec(), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn get_is_not_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload::new(dir.path(), "uploaded_file", 1024);

        let request = Request::builder().uri("/upload").body(Body::empty()).unwrap();
        let response = upload.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
