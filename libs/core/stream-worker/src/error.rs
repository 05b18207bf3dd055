//! Stream error types
//!
//! The category decides what happens to the entry that produced the error:
//! - **Transient**: leave it unacknowledged, the stream redelivers it
//! - **Permanent**: acknowledge and drop it

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Permanent,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transient => "transient",
            ErrorCategory::Permanent => "permanent",
        }
    }

    /// Whether the entry should be left pending for redelivery.
    pub fn redeliver(&self) -> bool {
        matches!(self, ErrorCategory::Transient)
    }
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Processing error: {message}")]
    Processing {
        message: String,
        category: ErrorCategory,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StreamError {
    pub fn transient(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Transient,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        StreamError::Processing {
            message: message.into(),
            category: ErrorCategory::Permanent,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Redis(_) => ErrorCategory::Transient,
            StreamError::Serialization(_) => ErrorCategory::Permanent,
            StreamError::Processing { category, .. } => *category,
            StreamError::Config(_) => ErrorCategory::Permanent,
        }
    }

    /// Consumer group missing, e.g. the stream was deleted under us.
    pub fn is_nogroup_error(&self) -> bool {
        matches!(self, StreamError::Redis(e) if e.to_string().contains("NOGROUP"))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            StreamError::Redis(e)
                if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
        )
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_categories() {
        assert_eq!(
            StreamError::transient("smtp down").category(),
            ErrorCategory::Transient
        );
        assert_eq!(
            StreamError::permanent("bad address").category(),
            ErrorCategory::Permanent
        );
    }

    #[test]
    fn test_only_transient_is_redelivered() {
        assert!(ErrorCategory::Transient.redeliver());
        assert!(!ErrorCategory::Permanent.redeliver());
    }

    #[test]
    fn test_serialization_errors_are_permanent() {
        let err: StreamError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, StreamError::Serialization(_)));
        assert_eq!(err.category(), ErrorCategory::Permanent);
    }

    #[test]
    fn test_processing_message_is_displayed() {
        let err = StreamError::transient("Connection refused");
        assert_eq!(err.to_string(), "Processing error: Connection refused");
        assert!(!err.is_connection_error());
        assert!(!err.is_nogroup_error());
    }
}
