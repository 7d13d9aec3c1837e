//! Request failure type.
//!
//! Every failure a request can end in is a [`RequestError`]: a non-2xx
//! response, a network error, an undecodable body, or an upload file that
//! could not be read. Its `Display` output is exactly the message shown after
//! `Error: ` on the status line, so a non-2xx body is surfaced verbatim.

use thiserror::Error;

/// The single error kind produced by the HTTP request helper.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The backend answered with a non-success status. `body` is the raw
    /// response text.
    #[error("{body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// A selected file could not be read before upload.
    #[error("{path}: {message}")]
    File { path: String, message: String },
}

impl RequestError {
    /// HTTP status code, when the backend responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::Decode(err.to_string())
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode(err.to_string())
    }
}
