//! Error types for the request pipeline.
//!
//! # Design
//! One variant per stage that can fail: URL parsing, body encoding, the
//! transport round-trip, and response decoding. Variants raised after a
//! response arrived keep the raw status (and, for decode failures, an excerpt
//! of the body) so a failed call can be diagnosed from the error alone.

use thiserror::Error;

/// Failure reported by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `Session` operations.
#[derive(Debug, Error)]
pub enum RestError {
    /// The resource URL does not parse as an absolute URL.
    #[error("malformed URL {url:?}: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The response body is not valid JSON or does not match the expected
    /// shape.
    #[error("failed to decode response (HTTP {status}): {diagnostic}; body: {body}")]
    Decode {
        diagnostic: String,
        status: u16,
        body: String,
    },

    /// The transport succeeded but the response carried no body.
    #[error("response had no body (HTTP {status})")]
    EmptyResponse { status: u16 },

    /// The request parameters could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl RestError {
    /// The HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RestError::Decode { status, .. } | RestError::EmptyResponse { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
