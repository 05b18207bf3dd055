//! User lifecycle events as published on the `user-events` stream.

use crate::composer::NotificationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use stream_worker::{StreamDef, StreamJob};

/// Consumer side of the `user-events` stream.
pub struct UserEventStream;

impl StreamDef for UserEventStream {
    const STREAM_NAME: &'static str = "user-events";
    const CONSUMER_GROUP: &'static str = "notification-group";
}

/// Event type tag, decoded once from the wire string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserEventType {
    UserCreated,
    UserDeleted,
    /// Any other tag, kept verbatim for logging.
    Unrecognized(String),
}

impl UserEventType {
    pub fn as_str(&self) -> &str {
        match self {
            UserEventType::UserCreated => "USER_CREATED",
            UserEventType::UserDeleted => "USER_DELETED",
            UserEventType::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for UserEventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "USER_CREATED" => UserEventType::UserCreated,
            "USER_DELETED" => UserEventType::UserDeleted,
            _ => UserEventType::Unrecognized(raw),
        }
    }
}

impl From<UserEventType> for String {
    fn from(event_type: UserEventType) -> Self {
        match event_type {
            UserEventType::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UserEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ "eventType": "...", "email": "...", "userName": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub event_type: UserEventType,
    pub email: String,
    /// Missing or null on the wire reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserEvent {
    pub fn new(
        event_type: UserEventType,
        email: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            email: email.into(),
            user_name: user_name.into(),
        }
    }

    pub fn user_created(email: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self::new(UserEventType::UserCreated, email, user_name)
    }

    pub fn user_deleted(email: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self::new(UserEventType::UserDeleted, email, user_name)
    }

    /// Template for this event, `None` for unrecognized types.
    pub fn notification_kind(&self) -> Option<NotificationKind> {
        match self.event_type {
            UserEventType::UserCreated => Some(NotificationKind::UserCreated),
            UserEventType::UserDeleted => Some(NotificationKind::UserDeleted),
            UserEventType::Unrecognized(_) => None,
        }
    }
}

impl StreamJob for UserEvent {
    fn job_id(&self) -> String {
        format!("{}:{}", self.event_type, self.email)
    }
}
