//! Turns (to, subject, body) into one transport call.

use crate::error::{NotificationError, NotificationResult};
use crate::transport::{MailTransport, OutboundMessage, TransportError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Result of one send attempt. Never retried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub ok: bool,
    pub error_detail: Option<String>,
}

impl DispatchOutcome {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            error_detail: None,
        }
    }
}

#[derive(Clone)]
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    from_email: String,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, from_email: impl Into<String>) -> Self {
        Self {
            transport,
            from_email: from_email.into(),
        }
    }

    /// Sends exactly once. A transport failure comes back as
    /// `MailDeliveryFailed` carrying the transport's text; a bad mailbox as
    /// `InvalidAddress`.
    #[instrument(skip(self, body), fields(transport = self.transport.name()))]
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> NotificationResult<DispatchOutcome> {
        let message = OutboundMessage {
            from: self.from_email.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        match self.transport.send(&message).await {
            Ok(()) => {
                info!(to = %message.to, "Email sent successfully");
                debug!(from = %message.from, subject = %message.subject, "Email details");
                Ok(DispatchOutcome::delivered())
            }
            // A rejected sender is a deployment fault; only a bad recipient is final
            Err(TransportError::Address { address, reason }) if address == message.from => {
                error!(from = %address, reason = %reason, "Sender address rejected by transport");
                Err(NotificationError::MailDeliveryFailed {
                    detail: format!("invalid sender address '{address}': {reason}"),
                })
            }
            Err(TransportError::Address { address, reason }) => {
                error!(to = %message.to, address = %address, reason = %reason, "Invalid email address");
                Err(NotificationError::InvalidAddress { address, reason })
            }
            Err(e) => {
                error!(to = %message.to, error = %e, "Failed to send email");
                Err(NotificationError::MailDeliveryFailed {
                    detail: e.to_string(),
                })
            }
        }
    }

    /// Probes the transport; failures are logged and reported as `false`.
    pub async fn check_connection(&self) -> bool {
        info!(
            transport = self.transport.name(),
            from = %self.from_email,
            "Checking mail transport connection"
        );

        match self.transport.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!(error = %e, "Mail transport connection check failed");
                false
            }
        }
    }
}
