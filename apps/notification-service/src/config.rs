use core_config::{
    ConfigError, Environment, FromEnv, env_or_default, env_parse, redis::RedisConfig,
    server::ServerConfig,
};
use domain_notifications::{NotificationConfig, SmtpConfig, UserEventStream};
use stream_worker::{StreamDef, WorkerConfig};

/// Stream the service consumes and how many events it handles at once
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEventsConfig {
    pub stream: String,
    pub group: String,
    pub max_concurrent_jobs: usize,
}

impl FromEnv for UserEventsConfig {
    /// - `USER_EVENTS_STREAM`: defaults to `user-events`
    /// - `USER_EVENTS_GROUP`: defaults to `notification-group`
    /// - `WORKER_MAX_CONCURRENT_JOBS`: defaults to `1`
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stream: env_or_default("USER_EVENTS_STREAM", UserEventStream::STREAM_NAME),
            group: env_or_default("USER_EVENTS_GROUP", UserEventStream::CONSUMER_GROUP),
            max_concurrent_jobs: env_parse("WORKER_MAX_CONCURRENT_JOBS", "1")?,
        })
    }
}

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub notification: NotificationConfig,
    pub smtp: SmtpConfig,
    pub user_events: UserEventsConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            notification: NotificationConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
            user_events: UserEventsConfig::from_env()?,
        })
    }

    /// Blocking reads are off: the worker shares one multiplexed connection,
    /// and a blocked `XREADGROUP` would stall its acks.
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig::from_stream_def::<UserEventStream>()
            .with_stream_name(self.user_events.stream.clone())
            .with_consumer_group(self.user_events.group.clone())
            .with_max_concurrent_jobs(self.user_events.max_concurrent_jobs)
            .with_blocking(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("REDIS_HOST", Some("redis://localhost:6379")),
                ("USER_EVENTS_STREAM", None),
                ("USER_EVENTS_GROUP", None),
                ("WORKER_MAX_CONCURRENT_JOBS", None),
                ("PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.user_events.stream, "user-events");
                assert_eq!(config.user_events.group, "notification-group");

                let worker = config.worker_config();
                assert_eq!(worker.stream_name, "user-events");
                assert_eq!(worker.consumer_group, "notification-group");
                assert_eq!(worker.max_concurrent_jobs, 1);
                assert!(!worker.is_blocking());
            },
        );
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("REDIS_HOST", Some("redis://localhost:6379")),
                ("USER_EVENTS_STREAM", Some("users")),
                ("USER_EVENTS_GROUP", Some("mailers")),
                ("WORKER_MAX_CONCURRENT_JOBS", Some("4")),
            ],
            || {
                let worker = Config::from_env().unwrap().worker_config();
                assert_eq!(worker.stream_name, "users");
                assert_eq!(worker.consumer_group, "mailers");
                assert_eq!(worker.max_concurrent_jobs, 4);
            },
        );
    }

    #[test]
    fn test_missing_redis_host() {
        temp_env::with_var_unset("REDIS_HOST", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("REDIS_HOST"));
        });
    }

    #[test]
    fn test_invalid_concurrency() {
        temp_env::with_vars(
            [
                ("REDIS_HOST", Some("redis://localhost:6379")),
                ("WORKER_MAX_CONCURRENT_JOBS", Some("many")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
