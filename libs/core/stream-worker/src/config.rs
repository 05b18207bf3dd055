use crate::registry::StreamDef;
use uuid::Uuid;

/// Configuration for the stream worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub stream_name: String,

    pub consumer_group: String,

    /// Unique consumer name within the group
    pub consumer_id: String,

    /// Pause between polls when not blocking
    pub poll_interval_ms: u64,

    pub batch_size: usize,

    /// `XREADGROUP BLOCK` timeout (None = non-blocking polling)
    pub blocking_timeout_ms: Option<u64>,

    /// In-flight deliveries; 1 processes sequentially
    pub max_concurrent_jobs: usize,

    /// Minimum idle time before claiming another consumer's pending entry
    pub claim_timeout_ms: u64,

    /// How often this consumer re-reads its own unacknowledged entries
    pub pending_retry_ms: u64,
}

impl WorkerConfig {
    pub fn from_stream_def<S: StreamDef>() -> Self {
        Self {
            stream_name: S::STREAM_NAME.to_string(),
            consumer_group: S::CONSUMER_GROUP.to_string(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            poll_interval_ms: S::POLL_INTERVAL_MS,
            batch_size: S::BATCH_SIZE,
            blocking_timeout_ms: Some(5000),
            max_concurrent_jobs: 1,
            claim_timeout_ms: S::CLAIM_TIMEOUT_MS,
            pending_retry_ms: S::PENDING_RETRY_MS,
        }
    }

    pub fn new(stream_name: impl Into<String>, consumer_group: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            consumer_group: consumer_group.into(),
            consumer_id: format!("worker-{}", Uuid::new_v4()),
            poll_interval_ms: 1000,
            batch_size: 10,
            blocking_timeout_ms: Some(5000),
            max_concurrent_jobs: 1,
            claim_timeout_ms: 30_000,
            pending_retry_ms: 5000,
        }
    }

    pub fn with_stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = name.into();
        self
    }

    pub fn with_consumer_group(mut self, group: impl Into<String>) -> Self {
        self.consumer_group = group.into();
        self
    }

    pub fn with_consumer_id(mut self, id: impl Into<String>) -> Self {
        self.consumer_id = id.into();
        self
    }

    pub fn with_poll_interval_ms(mut self, interval: u64) -> Self {
        self.poll_interval_ms = interval;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_blocking(mut self, timeout_ms: Option<u64>) -> Self {
        self.blocking_timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_concurrent_jobs(mut self, count: usize) -> Self {
        self.max_concurrent_jobs = count.max(1);
        self
    }

    pub fn with_claim_timeout_ms(mut self, timeout: u64) -> Self {
        self.claim_timeout_ms = timeout;
        self
    }

    pub fn with_pending_retry_ms(mut self, interval: u64) -> Self {
        self.pending_retry_ms = interval;
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking_timeout_ms.is_some()
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new("stream:jobs", "workers")
    }
}
