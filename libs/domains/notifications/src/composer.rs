//! Subject and body text for each notification kind.

pub const WELCOME_SUBJECT: &str = "Welcome to our website!";
pub const ACCOUNT_DELETED_SUBJECT: &str = "Your account has been deleted";
pub const SUPPORT_CONTACT_LINE: &str =
    "If this happened by mistake or you have any questions, please contact our support team.";

/// Template to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    UserCreated,
    UserDeleted,
    Custom { subject: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
}

/// Pure text rendering; same inputs always give the same output.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    site_url: String,
}

impl MessageComposer {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    /// `recipient_name` is interpolated as given, blank included.
    pub fn compose(&self, kind: &NotificationKind, recipient_name: &str) -> ComposedMessage {
        match kind {
            NotificationKind::UserCreated => ComposedMessage {
                subject: WELCOME_SUBJECT.to_string(),
                body: format!(
                    "Hello, {name}!\n\n\
                     Your account on {site} has been created successfully.\n\n\
                     We are glad to have you with us!\n\n\
                     {signature}",
                    name = recipient_name,
                    site = self.site_url,
                    signature = self.signature(),
                ),
            },
            NotificationKind::UserDeleted => ComposedMessage {
                subject: ACCOUNT_DELETED_SUBJECT.to_string(),
                body: format!(
                    "Hello, {name}!\n\n\
                     Your account on {site} has been deleted.\n\n\
                     {support}\n\n\
                     {signature}",
                    name = recipient_name,
                    site = self.site_url,
                    support = SUPPORT_CONTACT_LINE,
                    signature = self.signature(),
                ),
            },
            NotificationKind::Custom { subject, message } => ComposedMessage {
                subject: subject.clone(),
                body: format!("Hello!\n\n{message}\n\n{}", self.signature()),
            },
        }
    }

    fn signature(&self) -> String {
        format!("Best regards,\nThe {} team", self.site_url)
    }
}
