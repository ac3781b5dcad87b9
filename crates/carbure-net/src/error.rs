//! Error types for the REST client.

use carbure_core::FetchError;

/// Network-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// HTTP request failed.
    #[error("HTTP request error: {0}")]
    Request(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Connection refused or failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Too many redirects.
    #[error("Too many redirects")]
    TooManyRedirects,

    /// The response body is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP error status (4xx or 5xx).
    #[error("HTTP {status}{}", status_suffix(.message))]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: Option<String>,
    },
}

fn status_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_decode() {
            Self::Json(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for NetworkError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<NetworkError> for FetchError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::HttpStatus { status, message } => Self::Status { status, message },
            NetworkError::Json(message) => Self::Payload(message),
            other => Self::Request(other.to_string()),
        }
    }
}

/// A specialized Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_fetch_error() {
        let err = NetworkError::HttpStatus {
            status: 403,
            message: Some("Forbidden".into()),
        };
        assert_eq!(err.to_string(), "HTTP 403: Forbidden");
        assert_eq!(
            FetchError::from(err),
            FetchError::Status {
                status: 403,
                message: Some("Forbidden".into())
            }
        );

        assert_eq!(
            FetchError::from(NetworkError::Json("expected `data`".into())),
            FetchError::Payload("expected `data`".into())
        );
        assert_eq!(
            FetchError::from(NetworkError::Timeout),
            FetchError::Request("Request timed out".into())
        );
    }

    #[test]
    fn test_url_parse_error() {
        let err: NetworkError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }
}
