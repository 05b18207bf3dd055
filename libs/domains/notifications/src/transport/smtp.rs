//! SMTP transport using lettre.
//!
//! Plain SMTP (`SMTP_USE_TLS=false`) targets local catchers like Mailpit or
//! MailHog; TLS uses lettre's relay builder.

use super::{MailTransport, OutboundMessage, TransportError};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Optional for dev servers like Mailpit.
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    /// Per-command timeout.
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            use_tls: false,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for SmtpConfig {
    /// `SMTP_HOST` (localhost), `SMTP_PORT` (1025), `SMTP_USERNAME`,
    /// `SMTP_PASSWORD`, `SMTP_USE_TLS` (false), `SMTP_TIMEOUT_SECS` (10).
    fn from_env() -> Result<Self, ConfigError> {
        let use_tls = env_or_default("SMTP_USE_TLS", "false");
        Ok(Self {
            host: env_or_default("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", "1025")?,
            username: env_optional("SMTP_USERNAME"),
            password: env_optional("SMTP_PASSWORD"),
            use_tls: use_tls == "true" || use_tls == "1",
            timeout: Duration::from_secs(env_parse("SMTP_TIMEOUT_SECS", "10")?),
        })
    }
}

pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: SmtpConfig,
}

impl SmtpTransport {
    pub fn new(config: SmtpConfig) -> NotificationResult<Self> {
        let transport = Self::build_transport(&config)?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn build_transport(
        config: &SmtpConfig,
    ) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(|e| {
                NotificationError::Transport(format!("Failed to create SMTP relay: {}", e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mut builder = builder.port(config.port).timeout(Some(config.timeout));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
        address.parse().map_err(|e| TransportError::Address {
            address: address.to_string(),
            reason: format!("{}", e),
        })
    }

    fn build_message(message: &OutboundMessage) -> Result<Message, TransportError> {
        Message::builder()
            .from(Self::mailbox(&message.from)?)
            .to(Self::mailbox(&message.to)?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| TransportError::Message(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        debug!(
            to = %message.to,
            host = %self.config.host,
            port = self.config.port,
            "Sending email via SMTP"
        );

        let email = Self::build_message(message)?;

        self.transport.send(email).await.map_err(|e| {
            error!(to = %message.to, error = %e, "SMTP send failed");
            TransportError::Delivery(e.to_string())
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, TransportError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| TransportError::Delivery(format!("SMTP connection test failed: {}", e)))
    }

    fn name(&self) -> &'static str {
        "SMTP"
    }
}
