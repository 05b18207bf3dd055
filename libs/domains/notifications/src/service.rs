use crate::composer::{MessageComposer, NotificationKind};
use crate::config::NotificationConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::mailer::{DispatchOutcome, MailDispatcher};
use crate::transport::MailTransport;
use std::sync::Arc;
use tracing::{info, instrument};

/// Composer plus mail dispatcher, shared by the HTTP handlers and the
/// event dispatcher.
#[derive(Clone)]
pub struct NotificationService {
    composer: MessageComposer,
    mailer: MailDispatcher,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            composer: MessageComposer::new(config.site_url.clone()),
            mailer: MailDispatcher::new(transport, config.from_email.clone()),
        }
    }

    /// Composes `kind` for `recipient_name` and sends it to `to`.
    #[instrument(skip(self, kind), fields(kind = kind_label(kind)))]
    pub async fn send(
        &self,
        kind: &NotificationKind,
        to: &str,
        recipient_name: &str,
    ) -> NotificationResult<DispatchOutcome> {
        if to.trim().is_empty() {
            return Err(NotificationError::InvalidAddress {
                address: to.to_string(),
                reason: "recipient is blank".to_string(),
            });
        }

        let message = self.composer.compose(kind, recipient_name);
        self.mailer.send(to, &message.subject, &message.body).await
    }

    pub async fn send_user_created_email(
        &self,
        to: &str,
        user_name: &str,
    ) -> NotificationResult<DispatchOutcome> {
        info!(to = %to, "Sending welcome email");
        self.send(&NotificationKind::UserCreated, to, user_name).await
    }

    pub async fn send_custom_email(
        &self,
        to: &str,
        subject: &str,
        message: &str,
    ) -> NotificationResult<DispatchOutcome> {
        let kind = NotificationKind::Custom {
            subject: subject.to_string(),
            message: message.to_string(),
        };
        self.send(&kind, to, "").await
    }

    pub async fn check_connection(&self) -> bool {
        self.mailer.check_connection().await
    }
}

fn kind_label(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::UserCreated => "user_created",
        NotificationKind::UserDeleted => "user_deleted",
        NotificationKind::Custom { .. } => "custom",
    }
}
