//! Error types for the scnnr connection.
//!
//! # Design
//! Nothing here classifies failures. Whatever ureq, the `http` request
//! builder or serde_json reports is wrapped as-is so callers can match on the
//! underlying error. HTTP status codes are never turned into errors; a 4xx or
//! 5xx response is still a response.

/// Errors returned by `Connection` send and build methods.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed: connection refused, DNS, TLS, malformed response.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The request could not be assembled, usually an invalid URI or header.
    #[error("invalid request: {0}")]
    Request(#[from] ureq::http::Error),

    /// The JSON payload could not be serialized.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

pub type Result<T> = std::result::Result<T, Error>;
