//! Error types for the relay pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that can occur when delivering a message to a chat channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The webhook endpoint answered with a non-success status
    #[error("webhook returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Errors that abort handling of a single GitHub webhook request.
///
/// Every variant is terminal for the request and is reported to GitHub as a
/// plaintext 500 response.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required request header is absent
    #[error("Missing '{0}' header")]
    MissingHeader(&'static str),

    /// The signature names an algorithm we cannot compute
    #[error("Hash algorithm '{0}' not available")]
    UnsupportedAlgorithm(String),

    /// The computed HMAC does not match the supplied digest
    #[error("Signature does not match payload")]
    SignatureMismatch,

    /// The body is neither JSON nor a URL-encoded form
    #[error("Cannot parse payload, unsupported content type '{0}'")]
    UnsupportedContentType(String),

    /// The payload is not a JSON object of the expected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The chat message could not be delivered
    #[error("Failed to post to mattermost: {0}")]
    DeliveryFailed(#[from] ChannelError),
}

impl RelayError {
    /// Stable short name of the error kind, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader(_) => "missing_header",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::SignatureMismatch => "signature_mismatch",
            Self::UnsupportedContentType(_) => "unsupported_content_type",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::DeliveryFailed(_) => "delivery_failed",
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {self}\n")).into_response()
    }
}
