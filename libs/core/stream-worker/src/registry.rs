//! Stream definitions.
//!
//! Each domain declares its stream with a `StreamDef` so the producer and the
//! worker agree on names.

use strum::{AsRefStr, Display, EnumString};

/// Field names used in stream entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    /// The JSON-encoded payload.
    Job,
}

/// Stream definition trait.
///
/// ```rust,ignore
/// pub struct UserEventStream;
///
/// impl StreamDef for UserEventStream {
///     const STREAM_NAME: &'static str = "user-events";
///     const CONSUMER_GROUP: &'static str = "notification-group";
/// }
/// ```
pub trait StreamDef: Send + Sync {
    const STREAM_NAME: &'static str;

    const CONSUMER_GROUP: &'static str;

    /// Approximate MAXLEN applied by the producer.
    const MAX_LENGTH: i64 = 100_000;

    const BATCH_SIZE: usize = 10;

    const POLL_INTERVAL_MS: u64 = 1000;

    /// Idle time after which another consumer may claim a pending entry.
    const CLAIM_TIMEOUT_MS: u64 = 30_000;

    /// Delay before a consumer retries its own failed (pending) entries.
    const PENDING_RETRY_MS: u64 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_key() {
        assert_eq!(MessageKey::Job.to_string(), "job");
        assert_eq!(MessageKey::Job.as_ref(), "job");
        assert_eq!("job".parse::<MessageKey>().unwrap(), MessageKey::Job);
    }

    struct TestStream;
    impl StreamDef for TestStream {
        const STREAM_NAME: &'static str = "test:stream";
        const CONSUMER_GROUP: &'static str = "test_workers";
    }

    #[test]
    fn test_stream_def_defaults() {
        assert_eq!(TestStream::STREAM_NAME, "test:stream");
        assert_eq!(TestStream::MAX_LENGTH, 100_000);
        assert_eq!(TestStream::BATCH_SIZE, 10);
        assert_eq!(TestStream::CLAIM_TIMEOUT_MS, 30_000);
        assert_eq!(TestStream::PENDING_RETRY_MS, 5000);
    }
}
