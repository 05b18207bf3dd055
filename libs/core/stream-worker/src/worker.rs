//! Worker traits and the generic `StreamWorker` loop.

use crate::config::WorkerConfig;
use crate::consumer::{ReadBatch, StreamConsumer};
use crate::error::StreamError;
use crate::event::StreamEvent;
use crate::metrics::StreamMetrics;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const MAX_BACKOFF_SECS: u64 = 30;

/// Payload carried by a stream entry.
pub trait StreamJob: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Identifier used in logs.
    fn job_id(&self) -> String;
}

/// Handles one decoded entry.
///
/// `Ok(())` acknowledges the entry. An error whose category is transient
/// leaves it pending so the stream redelivers it; permanent errors
/// acknowledge and drop it.
#[async_trait]
pub trait StreamProcessor<J: StreamJob>: Send + Sync {
    async fn process(&self, job: &J) -> Result<(), StreamError>;

    fn name(&self) -> &'static str;

    /// Reachability of whatever the processor depends on.
    async fn health_check(&self) -> Result<bool, StreamError> {
        Ok(true)
    }
}

/// Consumer-group worker.
///
/// Each iteration reads new entries; every `pending_retry_ms` it first
/// re-reads this consumer's unacknowledged entries. With
/// `max_concurrent_jobs > 1` the batch is fanned out over a `JoinSet`,
/// bounded by a semaphore. Idle entries of other consumers are claimed every
/// `claim_timeout_ms`.
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    consumer: Arc<StreamConsumer>,
    processor: Arc<P>,
    config: WorkerConfig,
    metrics: StreamMetrics,
    concurrency_semaphore: Arc<Semaphore>,
    _phantom: PhantomData<J>,
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob + 'static,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(redis: ConnectionManager, processor: P, config: WorkerConfig) -> Self {
        Self::with_arc_processor(redis, Arc::new(processor), config)
    }

    pub fn with_arc_processor(
        redis: ConnectionManager,
        processor: Arc<P>,
        config: WorkerConfig,
    ) -> Self {
        let consumer = Arc::new(StreamConsumer::new(redis, config.clone()));
        let metrics = StreamMetrics::new(&config.stream_name, processor.name());
        let concurrency_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        Self {
            consumer,
            processor,
            config,
            metrics,
            concurrency_semaphore,
            _phantom: PhantomData,
        }
    }

    pub fn consumer(&self) -> &StreamConsumer {
        &self.consumer
    }

    /// Runs until `shutdown` flips to `true`.
    ///
    /// The flag is checked between batches; a batch that has started is
    /// finished first, so in-flight sends complete.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            blocking = self.config.is_blocking(),
            "Starting stream worker"
        );

        self.consumer.init_consumer_group().await?;

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let claim_interval = Duration::from_millis(self.config.claim_timeout_ms);
        let pending_retry = Duration::from_millis(self.config.pending_retry_ms);
        let mut last_claim = Instant::now();
        let mut last_pending: Option<Instant> = None;
        let mut consecutive_errors: u32 = 0;

        loop {
            if *shutdown.borrow() {
                info!("Received shutdown signal, stopping worker");
                break;
            }

            let pending_due = last_pending.is_none_or(|t| t.elapsed() >= pending_retry);

            match self.process_batch(pending_due).await {
                Ok(_) => {
                    if pending_due {
                        last_pending = Some(Instant::now());
                    }
                    if consecutive_errors > 0 {
                        info!(consecutive_errors, "Redis connection recovered");
                        consecutive_errors = 0;
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;

                    let backoff = if e.is_nogroup_error() {
                        warn!("Consumer group missing, recreating");
                        if let Err(create_err) = self.consumer.init_consumer_group().await {
                            error!(error = %create_err, "Failed to recreate consumer group");
                        }
                        Duration::from_secs(1)
                    } else if e.is_connection_error() {
                        let secs = 2u64.pow(consecutive_errors.min(5)).min(MAX_BACKOFF_SECS);
                        warn!(
                            error = %e,
                            consecutive_errors,
                            backoff_secs = secs,
                            "Redis connection error, backing off"
                        );
                        Duration::from_secs(secs)
                    } else {
                        error!(error = %e, "Error processing batch");
                        Duration::from_secs(1)
                    };

                    if Self::sleep_or_shutdown(&mut shutdown, backoff).await {
                        break;
                    }
                    continue;
                }
            }

            if last_claim.elapsed() >= claim_interval {
                if let Err(e) = self.claim_and_process().await {
                    debug!(error = %e, "Error claiming abandoned messages");
                }
                self.record_stream_info().await;
                last_claim = Instant::now();
            }

            // BLOCK already waited inside XREADGROUP
            if !self.config.is_blocking() && Self::sleep_or_shutdown(&mut shutdown, poll_interval).await
            {
                break;
            }
        }

        info!("Stream worker stopped");
        Ok(())
    }

    /// Sleeps for `duration`, returning `true` if shutdown was requested meanwhile.
    async fn sleep_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
        tokio::select! {
            changed = shutdown.changed() => {
                // A dropped sender counts as shutdown
                changed.is_err() || *shutdown.borrow()
            }
            _ = tokio::time::sleep(duration) => false,
        }
    }

    /// One iteration: this consumer's pending entries (when `include_pending`)
    /// followed by new ones. Returns how many entries were handled.
    pub async fn process_batch(&self, include_pending: bool) -> Result<usize, StreamError> {
        let mut handled = 0;

        if include_pending {
            let pending = self
                .consumer
                .read_pending::<J>(self.config.batch_size)
                .await?;
            if !pending.is_empty() {
                debug!(count = pending.len(), "Re-processing pending entries");
            }
            handled += self.dispatch(pending).await;
        }

        let fresh = self.consumer.read_new::<J>(self.config.batch_size).await?;
        handled += self.dispatch(fresh).await;

        Ok(handled)
    }

    async fn claim_and_process(&self) -> Result<usize, StreamError> {
        let claimed = self
            .consumer
            .claim_abandoned::<J>(self.config.batch_size)
            .await?;

        if !claimed.is_empty() {
            self.metrics.message_claimed(claimed.len());
        }

        Ok(self.dispatch(claimed).await)
    }

    async fn record_stream_info(&self) {
        match self.consumer.stream_info().await {
            Ok(info) => {
                self.metrics.stream_depth(info.length);
                self.metrics.pending_count(info.pending_count);
            }
            Err(e) => debug!(error = %e, "Failed to read stream info"),
        }
    }

    async fn dispatch(&self, batch: ReadBatch<J>) -> usize {
        let total = batch.len();

        for stream_id in batch.malformed {
            self.metrics.job_discarded();
            if let Err(e) = self.consumer.ack(&stream_id).await {
                error!(stream_id = %stream_id, error = %e, "Failed to acknowledge malformed entry");
            }
        }

        if self.config.max_concurrent_jobs == 1 {
            for event in batch.events {
                handle_event(&self.consumer, self.processor.as_ref(), &self.metrics, event).await;
            }
        } else {
            let mut join_set: JoinSet<()> = JoinSet::new();

            for event in batch.events {
                let semaphore = Arc::clone(&self.concurrency_semaphore);
                let consumer = Arc::clone(&self.consumer);
                let processor = Arc::clone(&self.processor);
                let metrics = self.metrics.clone();

                join_set.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    handle_event(&consumer, processor.as_ref(), &metrics, event).await;
                });
            }

            while let Some(joined) = join_set.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Job task panicked");
                }
            }
        }

        total
    }
}

/// Processes one entry and settles it: ack on success or permanent failure,
/// leave pending on transient failure.
async fn handle_event<J, P>(
    consumer: &StreamConsumer,
    processor: &P,
    metrics: &StreamMetrics,
    event: StreamEvent<J>,
) where
    J: StreamJob,
    P: StreamProcessor<J> + ?Sized,
{
    metrics.job_received();
    let start = Instant::now();

    debug!(
        stream_id = %event.stream_id,
        job_id = %event.job.job_id(),
        delivery = ?event.delivery,
        redelivery = event.is_redelivery(),
        age_ms = event.age_ms(),
        "Processing job"
    );

    match processor.process(&event.job).await {
        Ok(()) => {
            metrics.job_processed(start.elapsed());
            if let Err(e) = consumer.ack(&event.stream_id).await {
                // Stays pending; a later delivery will be processed again
                error!(stream_id = %event.stream_id, error = %e, "Failed to acknowledge job");
            }
        }
        Err(e) => {
            let category = e.category();
            metrics.job_failed(category);

            if category.redeliver() {
                warn!(
                    stream_id = %event.stream_id,
                    job_id = %event.job.job_id(),
                    error = %e,
                    "Job failed, leaving unacknowledged for redelivery"
                );
            } else {
                error!(
                    stream_id = %event.stream_id,
                    job_id = %event.job.job_id(),
                    error = %e,
                    "Job failed permanently, acknowledging and dropping"
                );
                if let Err(ack_err) = consumer.ack(&event.stream_id).await {
                    error!(stream_id = %event.stream_id, error = %ack_err, "Failed to acknowledge job");
                }
            }
        }
    }
}
