//! Crate-level error type.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, NegotiationError>;

/// Everything that can go wrong between the form and the chat channel.
///
/// Only the Session Initiator's `try_*` methods and the form layer surface
/// these to callers; the initiator's public `start` collapses them into an
/// absent session id after logging.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// A form field was empty or did not parse as a usable number.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The HTTP request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The backend answered 2xx but the body was not the expected shape.
    #[error("unexpected response body from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },

    /// `GET /api/session/{id}` returned 404.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The chat channel could not be opened or broke while open.
    #[error("websocket error on {url}: {source}")]
    Channel {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// Configuration file or value could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// The flow controller was asked to do something its current state forbids.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
