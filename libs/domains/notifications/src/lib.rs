//! Notifications Domain
//!
//! Turns user lifecycle events and API requests into emails.
//!
//! ```text
//! user-events stream ──► UserEventDispatcher ─┐
//!                                            ├─► NotificationService ─► MessageComposer
//! HTTP handlers ─────────────────────────────┘            │
//!                                                          └──► MailDispatcher ─► MailTransport
//! ```
//!
//! A failed send on a recognized event is returned to the stream worker
//! as a transient error, so the entry stays pending and is redelivered.
//! Unrecognized event types are logged and acknowledged.
//!
//! ```rust,ignore
//! use domain_notifications::{NotificationConfig, NotificationService, SmtpConfig, SmtpTransport};
//!
//! let transport = SmtpTransport::new(SmtpConfig::from_env()?)?;
//! let service = NotificationService::new(&NotificationConfig::from_env()?, Arc::new(transport));
//! service.send_user_created_email("ann@example.com", "Ann").await?;
//! ```

pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod service;
pub mod transport;

pub use composer::{ComposedMessage, MessageComposer, NotificationKind};
pub use config::NotificationConfig;
pub use dispatcher::{EventDisposition, UserEventDispatcher};
pub use error::{NotificationError, NotificationResult};
pub use events::{UserEvent, UserEventStream, UserEventType};
pub use handlers::{ApiDoc, router};
pub use mailer::{DispatchOutcome, MailDispatcher};
pub use models::{EmailRequest, EmailResponse, HealthResponse, WelcomeEmailRequest};
pub use service::NotificationService;
pub use transport::{
    InMemoryTransport, MailTransport, OutboundMessage, SmtpConfig, SmtpTransport, TransportError,
};
