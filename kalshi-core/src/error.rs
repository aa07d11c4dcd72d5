//! Error types for the Kalshi client
//!
//! Every failed call surfaces exactly one [`KalshiError`] variant. The variant
//! is the classification: it decides whether the request pipeline retries and
//! tells the caller what went wrong.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Client-wide error type
#[derive(Error, Debug, Clone)]
pub enum KalshiError {
    /// Bad key material, signing failure, or a 401/403 from the server
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// Input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP 429
    #[error("Rate limit exceeded ({status}): {message}")]
    RateLimited {
        message: String,
        status: u16,
        body: Option<String>,
        retry_after: Option<Duration>,
    },

    /// Any other 4xx
    #[error("Client error ({status}): {message}")]
    Client {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// 5xx
    #[error("Server error ({status}): {message}")]
    Server {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// No response was obtained (connect, DNS, reset, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded
    #[error("Malformed response: {message}")]
    Malformed {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fieldless discriminant of [`KalshiError`], used for retry decisions and matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    Validation,
    RateLimited,
    Client,
    Server,
    Network,
    Malformed,
    Config,
}

impl ErrorKind {
    /// Whether a failure of this kind may succeed if the same request is sent again
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::Server | ErrorKind::Network
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Client => "client",
            ErrorKind::Server => "server",
            ErrorKind::Network => "network",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

impl KalshiError {
    pub fn auth(msg: impl Into<String>) -> Self {
        KalshiError::Authentication {
            message: msg.into(),
            status: None,
            body: None,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        KalshiError::Validation(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        KalshiError::Network(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        KalshiError::Malformed {
            message: msg.into(),
            status: None,
            body: None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        KalshiError::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            KalshiError::Authentication { .. } => ErrorKind::Authentication,
            KalshiError::Validation(_) => ErrorKind::Validation,
            KalshiError::RateLimited { .. } => ErrorKind::RateLimited,
            KalshiError::Client { .. } => ErrorKind::Client,
            KalshiError::Server { .. } => ErrorKind::Server,
            KalshiError::Network(_) => ErrorKind::Network,
            KalshiError::Malformed { .. } => ErrorKind::Malformed,
            KalshiError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status of the response that produced this error, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            KalshiError::Authentication { status, .. } | KalshiError::Malformed { status, .. } => {
                *status
            }
            KalshiError::RateLimited { status, .. }
            | KalshiError::Client { status, .. }
            | KalshiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, kept for diagnostics
    pub fn body(&self) -> Option<&str> {
        match self {
            KalshiError::Authentication { body, .. }
            | KalshiError::RateLimited { body, .. }
            | KalshiError::Client { body, .. }
            | KalshiError::Server { body, .. }
            | KalshiError::Malformed { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, KalshiError::Client { status: 404, .. })
    }
}

/// Result type alias for client operations
pub type KalshiResult<T> = Result<T, KalshiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_transience() {
        assert!(KalshiError::network("reset").kind().is_transient());
        assert!(!KalshiError::auth("bad key").kind().is_transient());
        assert!(!KalshiError::malformed("eof").kind().is_transient());

        let rate_limited = KalshiError::RateLimited {
            message: "slow down".to_string(),
            status: 429,
            body: None,
            retry_after: None,
        };
        assert_eq!(rate_limited.kind(), ErrorKind::RateLimited);
        assert!(rate_limited.kind().is_transient());
    }

    #[test]
    fn test_status_and_body_accessors() {
        let err = KalshiError::Client {
            message: "not found".to_string(),
            status: 404,
            body: Some(r#"{"error":"missing"}"#.to_string()),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some(r#"{"error":"missing"}"#));
        assert!(err.is_not_found());

        let err = KalshiError::network("timed out");
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display() {
        let err = KalshiError::Server {
            message: "bad gateway".to_string(),
            status: 502,
            body: None,
        };
        assert_eq!(err.to_string(), "Server error (502): bad gateway");
        assert_eq!(ErrorKind::RateLimited.to_string(), "rate_limited");
    }
}
