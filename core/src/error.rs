//! Error types for the board/list/card client.
//!
//! # Design
//! A 404 is not represented here: the client returns it as a normal
//! `ApiResponse` with no payload so lookups and repeated deletes need no
//! error-driven control flow. Every other non-2xx response lands in
//! `Rejected` with the raw status code and body. Local precondition failures
//! are raised before any request leaves the process.

use thiserror::Error;

/// Errors returned by `ResourceClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A mandatory identifier was empty. No request was sent.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An identifier cannot be used as a path segment. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The caller tried to set a parameter the client injects itself.
    #[error("parameter `{0}` is reserved for credentials")]
    ReservedParameter(String),

    /// The server returned a non-2xx status other than 404.
    #[error("request failed: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    /// A success response body did not match the expected shape.
    #[error("could not decode HTTP {status} response: {message}")]
    Decode { status: u16, message: String },

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The base URL and resource path could not be combined.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } | ApiError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for rejections.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}
