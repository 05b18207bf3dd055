//! Routes decoded user events to the right notification.

use crate::error::{NotificationError, NotificationResult};
use crate::events::UserEvent;
use crate::service::NotificationService;
use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{StreamError, StreamProcessor};
use tracing::{info, instrument, warn};

/// Terminal state of one event. Both variants mean "acknowledge".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Sent,
    Ignored,
}

/// Stateless per event. A failed send is returned unchanged so the stream
/// leaves the entry pending and redelivers it.
#[derive(Clone)]
pub struct UserEventDispatcher {
    service: Arc<NotificationService>,
}

impl UserEventDispatcher {
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }

    #[instrument(skip(self, event), fields(event_type = %event.event_type, to = %event.email))]
    pub async fn dispatch(&self, event: &UserEvent) -> NotificationResult<EventDisposition> {
        let Some(kind) = event.notification_kind() else {
            warn!(event_type = %event.event_type, "Unknown event type, ignoring");
            return Ok(EventDisposition::Ignored);
        };

        self.service
            .send(&kind, &event.email, &event.user_name)
            .await?;

        info!("User event handled");
        Ok(EventDisposition::Sent)
    }
}

fn to_stream_error(err: NotificationError) -> StreamError {
    if err.is_retryable() {
        StreamError::transient(err.to_string())
    } else {
        StreamError::permanent(err.to_string())
    }
}

#[async_trait]
impl StreamProcessor<UserEvent> for UserEventDispatcher {
    async fn process(&self, job: &UserEvent) -> Result<(), StreamError> {
        self.dispatch(job).await.map(|_| ()).map_err(to_stream_error)
    }

    fn name(&self) -> &'static str {
        "user_event_dispatcher"
    }

    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(self.service.check_connection().await)
    }
}
