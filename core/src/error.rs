//! Error types for the API client.
//!
//! # Design
//! Every failed call produces one `ApiError` tagged with the endpoint and a
//! method. Transport and decode failures share that shape; the handler tells
//! them apart through `FailureCause`. HTTP status codes are never errors.

use crate::http::HttpMethod;

/// Failure reported by a `Transport`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or protocol failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The task executing the request was cancelled or panicked.
    #[error("request aborted: {0}")]
    Aborted(String),

    /// A `MockTransport` was called with no reply queued.
    #[error("no scripted reply for request to {0}")]
    Unscripted(String),
}

/// Why a call failed.
#[derive(Debug, thiserror::Error)]
pub enum FailureCause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response arrived but its body is not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FailureCause {
    pub fn is_transport(&self) -> bool {
        matches!(self, FailureCause::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FailureCause::Decode(_))
    }
}

/// Error delivered to the client's error handler and returned to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{method} {endpoint}: {error}")]
pub struct ApiError {
    pub endpoint: String,
    pub method: HttpMethod,
    #[source]
    pub error: FailureCause,
}
