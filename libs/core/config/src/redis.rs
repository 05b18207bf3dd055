use crate::{env_required, ConfigError, FromEnv};

/// Connection settings for the Redis instance backing the event streams
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub uri: String,
}

impl RedisConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl FromEnv for RedisConfig {
    /// Requires `REDIS_HOST` (a full `redis://` URL).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            uri: env_required("REDIS_HOST")?,
        })
    }
}
