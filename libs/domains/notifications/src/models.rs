use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

pub const HEALTH_STATUS: &str = "Notification Service is running";
pub const HEALTH_SERVICE: &str = "OK";

/// Request to send a custom email.
///
/// Missing fields read as empty so they fail validation with the field's
/// own message instead of a body-parsing error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailRequest {
    /// Recipient address
    #[validate(custom(function = "validate_recipient"))]
    #[schema(example = "user@example.com")]
    pub to_email: String,
    /// 1 to 200 characters
    #[validate(custom(function = "validate_subject"))]
    #[schema(example = "Test Subject")]
    pub subject: String,
    /// 1 to 2000 characters
    #[validate(custom(function = "validate_message"))]
    #[schema(example = "This is a test message")]
    pub message: String,
}

/// Request to send the welcome email for a new user.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeEmailRequest {
    #[validate(custom(function = "validate_recipient"))]
    #[schema(example = "user@example.com")]
    pub to_email: String,
    #[validate(custom(function = "validate_user_name"))]
    #[schema(example = "John Doe")]
    pub user_name: String,
}

// One validator per field: `validator` reports built-in rules before custom
// ones, so the blank check has to live in the same function to come first.

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_recipient(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("not_blank", "Email recipient is mandatory"));
    }
    if !value.validate_email() {
        return Err(field_error("email", "Email should be valid"));
    }
    Ok(())
}

fn validate_subject(value: &str) -> Result<(), ValidationError> {
    validate_text(
        value,
        200,
        "Subject is mandatory",
        "Subject must be between 1 and 200 characters",
    )
}

fn validate_message(value: &str) -> Result<(), ValidationError> {
    validate_text(
        value,
        2000,
        "Message is mandatory",
        "Message must be between 1 and 2000 characters",
    )
}

fn validate_user_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("not_blank", "User name is mandatory"));
    }
    Ok(())
}

/// Length is counted in characters.
fn validate_text(
    value: &str,
    max: usize,
    blank_message: &'static str,
    length_message: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("not_blank", blank_message));
    }
    if value.chars().count() > max {
        return Err(field_error("length", length_message));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub href: String,
}

/// Relation name to link, e.g. `"health-check"`.
pub type Links = BTreeMap<String, Link>;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
    /// Recipient, `null` when the request failed validation
    pub email: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: Links,
}

impl EmailResponse {
    pub fn new(success: bool, message: impl Into<String>, email: Option<String>) -> Self {
        Self {
            success,
            message: message.into(),
            email,
            links: Links::new(),
        }
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), Link { href: href.into() });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(rename = "_links", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: Links,
}

impl HealthResponse {
    pub fn running() -> Self {
        Self {
            status: HEALTH_STATUS.to_string(),
            service: HEALTH_SERVICE.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            links: Links::new(),
        }
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), Link { href: href.into() });
        self
    }
}
