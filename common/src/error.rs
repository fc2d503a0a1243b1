//! Error types for the external rate service.

use thiserror::Error;

/// Failure reported by, or while talking to, the rate service.
///
/// Every variant collapses to the same "unavailable" condition for the
/// conversion core; the distinction only matters for retries and logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service answered but its result field was not "success".
    #[error("Rate service reported failure: {error_type}")]
    Api { error_type: String },

    /// Non-success HTTP status.
    #[error("Rate service returned HTTP {status}")]
    Status { status: u16 },

    /// The request never completed (connect, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body could not be decoded into the expected envelope.
    #[error("Malformed rate service response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Create an API failure from the service's `error-type` field.
    pub fn api(error_type: impl Into<String>) -> Self {
        ServiceError::Api {
            error_type: error_type.into(),
        }
    }

    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Transport(_) => true,
            ServiceError::Status { status } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            ServiceError::Api { .. } | ServiceError::Decode(_) => false,
        }
    }

    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Api { .. } => "API_FAILURE",
            ServiceError::Status { .. } => "HTTP_STATUS",
            ServiceError::Transport(_) => "TRANSPORT",
            ServiceError::Decode(_) => "DECODE",
        }
    }
}

/// Result type alias for rate service calls.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ServiceError::Transport("connection reset".into()).is_retryable());
        assert!(ServiceError::Status { status: 503 }.is_retryable());
        assert!(ServiceError::Status { status: 429 }.is_retryable());
        assert!(!ServiceError::Status { status: 404 }.is_retryable());
        assert!(!ServiceError::api("invalid-key").is_retryable());
        assert!(!ServiceError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::api("unsupported-code");
        assert_eq!(err.to_string(), "Rate service reported failure: unsupported-code");
        assert_eq!(err.error_code(), "API_FAILURE");
    }
}
