//! Waitlist error taxonomy.
//!
//! Failures are grouped by what the shopper should be told, not by where
//! they happened: see [`ErrorKind`].

use thiserror::Error;

use crate::messages::WaitlistMessages;

/// What went wrong with a join or leave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local validation failed; no request was sent.
    InvalidEmail,
    /// The service answered 429.
    RateLimited,
    /// No usable response: connection failure, timeout, malformed body.
    Network,
    /// The service rejected the request without saying why.
    Unknown,
}

impl ErrorKind {
    /// Default shopper-facing message for this kind.
    #[must_use]
    pub fn message(self, messages: &WaitlistMessages) -> &str {
        match self {
            Self::InvalidEmail => &messages.invalid_email,
            Self::RateLimited => &messages.rate_limited,
            Self::Network => &messages.network,
            Self::Unknown => &messages.unknown,
        }
    }
}

/// Transport-level failures. Always reported to shoppers as
/// [`ErrorKind::Network`].
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e.to_string())
        }
    }
}

/// Errors returned by [`crate::WaitlistClient`] join and leave calls.
///
/// Application-level rejections are not errors at this layer: they come
/// back as a [`crate::Reply`] for the session to interpret.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Rate limited by the waitlist service.
    #[error("Rate limited")]
    RateLimited,

    /// Transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success status carried a body that is not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RequestError {
    /// Shopper-facing classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Transport(_) | Self::Parse(_) => ErrorKind::Network,
        }
    }
}

/// Errors returned by waitlist count fetches.
#[derive(Debug, Error)]
pub enum CountError {
    /// The service answered with a non-success status other than 404.
    #[error("waitlist count request failed with status {0}")]
    Status(u16),

    /// Transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body is not a count response.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
