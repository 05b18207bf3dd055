//! Error types for the notifications domain.

use core_config::ConfigError;
use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The transport rejected or failed the send. `detail` is the
    /// transport's own error text.
    #[error("Mail delivery failed: {detail}")]
    MailDeliveryFailed { detail: String },

    /// Sender or recipient is not a usable mailbox; resending cannot help.
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The transport could not be constructed.
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl NotificationError {
    /// Text reported back to HTTP callers after "Failed to send email: ".
    pub fn detail(&self) -> String {
        match self {
            NotificationError::MailDeliveryFailed { detail } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Whether delivering the same message again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotificationError::MailDeliveryFailed { .. } => true,
            NotificationError::Transport(_) => true,
            NotificationError::InvalidAddress { .. } => false,
            NotificationError::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_failure_detail_is_transport_text() {
        let err = NotificationError::MailDeliveryFailed {
            detail: "Connection refused".to_string(),
        };
        assert_eq!(err.detail(), "Connection refused");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_address_is_not_retryable() {
        let err = NotificationError::InvalidAddress {
            address: "nobody".to_string(),
            reason: "Missing domain or user".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.detail().contains("nobody"));
    }
}
