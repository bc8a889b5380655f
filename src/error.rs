//! Error handling and custom error types
//!
//! Provides unified error handling across the relay using thiserror. The same
//! enum is rendered as the JSON `{"error": ...}` body returned to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Error, Debug)]
pub enum Error {
    #[error("REPLICATE_API_TOKEN not set")]
    MissingApiToken,

    #[error("No image file provided")]
    MissingImage,

    #[error("No output from model")]
    NoOutput,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upload rejected by the body size limit.
    #[error("Upload too large: {0}")]
    UploadTooLarge(axum::extract::multipart::MultipartError),

    #[error("{0}")]
    Replicate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tunnel error: {0}")]
    Tunnel(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingImage => StatusCode::BAD_REQUEST,
            Error::UploadTooLarge(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller.
    ///
    /// With `sanitize` set, failures other than the two precondition errors
    /// are replaced by a generic message; the full text still goes to the log.
    pub fn public_message(&self, sanitize: bool) -> String {
        match self {
            Error::MissingApiToken | Error::MissingImage => self.to_string(),
            _ if sanitize => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn to_response(&self, sanitize: bool) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message(sanitize),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages_match_wire_contract() {
        assert_eq!(
            Error::MissingApiToken.to_string(),
            "REPLICATE_API_TOKEN not set"
        );
        assert_eq!(Error::MissingImage.to_string(), "No image file provided");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::MissingApiToken.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Replicate("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sanitize_hides_remote_detail_only() {
        let err = Error::Replicate("invalid token abc123".to_string());
        assert_eq!(err.public_message(false), "invalid token abc123");
        assert_eq!(err.public_message(true), "Internal server error");
        assert_eq!(
            Error::MissingApiToken.public_message(true),
            "REPLICATE_API_TOKEN not set"
        );
    }
}
