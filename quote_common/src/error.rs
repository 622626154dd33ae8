//! Error types shared between client and server.
//!
//! The `QuoteError` enum unifies the failure cases of both processes: I/O on the
//! client's output file, JSON decoding, HTTP transport, storage and deadline
//! expiry. Crates propagate it through the workspace-wide `Result` alias.
use std::io;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// HTTP transport failure or non-success status from a peer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A step did not finish within its budget; contains the step name.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Database connection, schema or insert failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl QuoteError {
    /// `true` when the error is a deadline expiry rather than a hard failure.
    pub fn is_timeout(&self) -> bool {
        match self {
            QuoteError::Timeout(_) => true,
            QuoteError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}
