//! Mail transport capability and its implementations.

mod memory;
mod smtp;

pub use memory::InMemoryTransport;
pub use smtp::{SmtpConfig, SmtpTransport};

use async_trait::async_trait;
use thiserror::Error;

/// Built fresh for every send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Delivery(String),
}

/// Something that can deliver an [`OutboundMessage`]. Timeouts belong to
/// the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Whether the transport can currently reach its server.
    async fn health_check(&self) -> Result<bool, TransportError>;

    fn name(&self) -> &'static str;
}
