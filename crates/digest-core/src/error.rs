//! Error types for diff-digest.

use thiserror::Error;

/// Result type alias using diff-digest's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for diff-digest operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Request validation failed (missing or empty field)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upstream service (diff source or model API) returned a failure.
    /// Carries the upstream HTTP status when one was received.
    #[error("Upstream error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network/transport failure before or during a stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local cache read/write failure (always recoverable)
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an upstream error from an HTTP status and message.
    pub fn upstream(status: impl Into<Option<u16>>, message: impl Into<String>) -> Self {
        Error::Upstream {
            status: status.into(),
            message: message.into(),
        }
    }

    /// The upstream HTTP status carried by this error, when there is one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::Upstream {
                status: Some(status.as_u16()),
                message: e.to_string(),
            },
            None => Error::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("Missing required field: diff".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: Missing required field: diff"
        );
    }

    #[test]
    fn test_error_display_upstream_with_status() {
        let err = Error::upstream(429, "rate limited");
        assert_eq!(err.to_string(), "Upstream error (429): rate limited");
    }

    #[test]
    fn test_error_display_upstream_without_status() {
        let err = Error::upstream(None, "connection refused");
        assert_eq!(err.to_string(), "Upstream error: connection refused");
    }

    #[test]
    fn test_error_display_serialization() {
        let err = Error::Serialization("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_error_display_transport() {
        let err = Error::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_error_display_cache() {
        let err = Error::Cache("disk full".to_string());
        assert_eq!(err.to_string(), "Cache error: disk full");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_internal() {
        let err = Error::Internal("unexpected state".to_string());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_upstream_status_accessor() {
        assert_eq!(Error::upstream(502, "bad gateway").upstream_status(), Some(502));
        assert_eq!(Error::upstream(None, "timed out").upstream_status(), None);
        assert_eq!(
            Error::Transport("reset".to_string()).upstream_status(),
            None
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(Error::Internal("test".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::InvalidInput("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidInput"));
    }
}
