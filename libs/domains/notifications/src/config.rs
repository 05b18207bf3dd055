use core_config::{ConfigError, FromEnv, env_or_default};
use lettre::message::Mailbox;

/// Sender identity and the site named in every template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub from_email: String,
    pub site_url: String,
}

impl NotificationConfig {
    pub fn new(from_email: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
            site_url: site_url.into(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self::new("no-reply@example.com", "https://example.com")
    }
}

impl FromEnv for NotificationConfig {
    /// - `APP_EMAIL_FROM`: defaults to `no-reply@example.com`
    /// - `APP_EMAIL_SITE_URL`: defaults to `https://example.com`
    ///
    /// The sender must parse as a mailbox: every send would fail otherwise.
    fn from_env() -> Result<Self, ConfigError> {
        let from_email = env_or_default("APP_EMAIL_FROM", "no-reply@example.com");
        from_email
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::ParseError {
                key: "APP_EMAIL_FROM".to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            from_email,
            site_url: env_or_default("APP_EMAIL_SITE_URL", "https://example.com"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("APP_EMAIL_FROM", None::<&str>),
                ("APP_EMAIL_SITE_URL", None::<&str>),
            ],
            || {
                let config = NotificationConfig::from_env().unwrap();
                assert_eq!(config, NotificationConfig::default());
            },
        );
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("APP_EMAIL_FROM", Some("hello@shop.test")),
                ("APP_EMAIL_SITE_URL", Some("https://shop.test")),
            ],
            || {
                let config = NotificationConfig::from_env().unwrap();
                assert_eq!(config.from_email, "hello@shop.test");
                assert_eq!(config.site_url, "https://shop.test");
            },
        );
    }

    #[test]
    fn test_unparseable_sender_is_rejected() {
        temp_env::with_var("APP_EMAIL_FROM", Some("not-an-address"), || {
            let err = NotificationConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "APP_EMAIL_FROM"));
        });
    }

    #[test]
    fn test_display_name_sender_is_accepted() {
        temp_env::with_var("APP_EMAIL_FROM", Some("Shop <hello@shop.test>"), || {
            let config = NotificationConfig::from_env().unwrap();
            assert_eq!(config.from_email, "Shop <hello@shop.test>");
        });
    }
}
