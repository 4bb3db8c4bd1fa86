//! Error types returned by the client.
//!
//! Every HTTP failure is surfaced as a typed [`Error`] carrying the status
//! code (when the server produced one) and the server's message.

use std::time::Duration;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Connection or IO failure while talking to the server.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the credentials (401) or the operation (403).
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A 5xx response, or a job that the server reported as failed.
    #[error("Server error{}: {message}", fmt_status(.status))]
    Server { status: Option<u16>, message: String },

    /// Any other non-successful status (e.g. 400, 409 without a usable body).
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    /// The poll deadline passed (or polling was cancelled) before the job finished.
    #[error("Job did not finish after {polls} polls ({elapsed:?})")]
    Timeout { polls: u32, elapsed: Duration },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {message}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!(" ({status})"),
        None => String::new(),
    }
}

impl Error {
    /// Maps a non-successful HTTP status to the matching error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Error::Authentication { status, message },
            404 => Error::NotFound { message },
            500..=599 => Error::Server {
                status: Some(status),
                message,
            },
            _ => Error::Http { status, message },
        }
    }

    pub fn decode(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            message: message.into(),
            source,
        }
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            Error::Authentication { status, .. } | Error::Http { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            Error::Server { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether a poll that failed with this error may be retried.
    ///
    /// Only connection-level failures and undecodable bodies qualify; a job
    /// the server reported as failed is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Decode { .. })
    }
}
