//! Error types for Carbure.

/// Errors raised while fetching options from a remote source.
///
/// Stored by the async option cache and handed out to widgets, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or did not complete.
    #[error("Request failed: {0}")]
    Request(String),

    /// The backend answered with an error status.
    #[error("HTTP {status}{}", status_suffix(.message))]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Optional error message from the response body.
        message: Option<String>,
    },

    /// The payload could not be decoded into items.
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// Any other failure reported by a caller-supplied fetcher.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Create a free-form error, typically from a caller-supplied fetcher.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

fn status_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// A specialized Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
