//! Stream Worker
//!
//! Consumes a Redis stream through a consumer group and hands each decoded
//! entry to a [`StreamProcessor`].
//!
//! Delivery contract:
//!
//! - `Ok(())` from the processor: the entry is acknowledged (`XACK`).
//! - Transient error: the entry stays in the group's pending list and is
//!   redelivered, first through this consumer's pending read, later through
//!   idle-claim (`XCLAIM`) by any consumer.
//! - Permanent error or undecodable payload: acknowledged and logged, so a
//!   poison entry never wedges the group.
//!
//! There is no retry counter and no dead letter stream; redelivery is the
//! queue's job.
//!
//! ```ignore
//! use stream_worker::{StreamDef, StreamWorker, WorkerConfig};
//!
//! struct UserEventStream;
//! impl StreamDef for UserEventStream {
//!     const STREAM_NAME: &'static str = "user-events";
//!     const CONSUMER_GROUP: &'static str = "notification-group";
//! }
//!
//! let config = WorkerConfig::from_stream_def::<UserEventStream>();
//! let worker = StreamWorker::new(redis, processor, config);
//! worker.run(shutdown_rx).await?;
//! ```

mod config;
mod consumer;
mod error;
mod event;
pub mod metrics;
mod producer;
mod registry;
mod worker;

pub use config::WorkerConfig;
pub use consumer::{ReadBatch, StreamConsumer, StreamInfo};
pub use error::{ErrorCategory, StreamError};
pub use event::{Delivery, StreamEvent};
pub use metrics::{StreamMetrics, init_metrics, render_metrics};
pub use producer::StreamProducer;
pub use registry::{MessageKey, StreamDef};
pub use worker::{StreamJob, StreamProcessor, StreamWorker};
