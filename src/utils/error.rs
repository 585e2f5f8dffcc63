//! Error handling for ytinfo

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

/// `Cache-Control` value attached to every error response.
pub const NO_STORE: &str = "no-store, max-age=0";

/// Errors raised by an extraction backend
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    NotFound,

    /// The backend itself reported that it could not resolve the query.
    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid UTF-8 in extractor output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// HTTP-level error taxonomy. Every variant renders as a plain-text,
/// non-cacheable response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("FFmpeg error: {0}")]
    Transcode(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Download(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Transcode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Download(message) => ApiError::Download(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", body);
        } else {
            warn!(status = status.as_u16(), "{}", body);
        }

        (status, [(header::CACHE_CONTROL, NO_STORE)], body).into_response()
    }
}
