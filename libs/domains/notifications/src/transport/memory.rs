use super::{MailTransport, OutboundMessage, TransportError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records messages instead of sending them. Clones share the same record,
/// so a test can keep one handle and give another to the service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with `detail` until [`recover`](Self::recover) is called.
    pub fn failing(detail: impl Into<String>) -> Self {
        let transport = Self::new();
        transport.fail_with(detail);
        transport
    }

    pub fn fail_with(&self, detail: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(detail.into());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn last(&self) -> Option<OutboundMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl MailTransport for InMemoryTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if let Some(detail) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(TransportError::Delivery(detail));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, TransportError> {
        Ok(self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutboundMessage {
        OutboundMessage {
            from: "no-reply@example.com".to_string(),
            to: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_sent_messages_across_clones() {
        let transport = InMemoryTransport::new();
        let handle = transport.clone();

        transport.send(&message()).await.unwrap();

        assert_eq!(handle.sent_count(), 1);
        assert_eq!(handle.last(), Some(message()));
    }

    #[tokio::test]
    async fn test_failing_then_recovering() {
        let transport = InMemoryTransport::failing("Connection refused");

        let err = transport.send(&message()).await.unwrap_err();
        assert_eq!(err, TransportError::Delivery("Connection refused".to_string()));
        assert!(!transport.health_check().await.unwrap());
        assert_eq!(transport.sent_count(), 0);

        transport.recover();
        transport.send(&message()).await.unwrap();
        assert_eq!(transport.sent_count(), 1);
    }
}
