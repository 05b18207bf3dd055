//! Consumer-group reads, acknowledgements and idle-claim

use crate::config::WorkerConfig;
use crate::error::StreamError;
use crate::event::{Delivery, StreamEvent};
use crate::registry::MessageKey;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Entry as returned by XREADGROUP/XCLAIM. Fields are nil for entries
/// trimmed from the stream while still pending.
type RawEntry = (String, Option<HashMap<String, String>>);
type ReadReply = Vec<(String, Vec<RawEntry>)>;

/// Decoded entries plus the IDs of entries that could not be decoded.
#[derive(Debug)]
pub struct ReadBatch<J> {
    pub events: Vec<StreamEvent<J>>,
    pub malformed: Vec<String>,
}

impl<J> ReadBatch<J> {
    pub fn empty() -> Self {
        Self {
            events: Vec::new(),
            malformed: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.malformed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len() + self.malformed.len()
    }
}

#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub stream_name: String,
    pub consumer_group: String,
    pub length: i64,
    pub pending_count: i64,
}

pub struct StreamConsumer {
    redis: ConnectionManager,
    config: WorkerConfig,
}

impl StreamConsumer {
    pub fn new(redis: ConnectionManager, config: WorkerConfig) -> Self {
        Self { redis, config }
    }

    pub fn stream_name(&self) -> &str {
        &self.config.stream_name
    }

    pub fn consumer_group(&self) -> &str {
        &self.config.consumer_group
    }

    pub fn consumer_id(&self) -> &str {
        &self.config.consumer_id
    }

    /// Creates the group (and the stream) if missing. `BUSYGROUP` is fine.
    pub async fn init_consumer_group(&self) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => {
                info!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Created consumer group"
                );
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_name,
                    group = %self.config.consumer_group,
                    "Consumer group already exists"
                );
            }
            Err(e) => return Err(StreamError::Redis(e)),
        }

        Ok(())
    }

    /// Entries delivered to this consumer but never acknowledged.
    pub async fn read_pending<J: DeserializeOwned>(
        &self,
        count: usize,
    ) -> Result<ReadBatch<J>, StreamError> {
        let mut conn = self.redis.clone();

        let reply: ReadReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg("0")
            .query_async(&mut conn)
            .await?;

        Ok(Self::parse_reply(reply, Delivery::Pending))
    }

    /// New entries, blocking up to `blocking_timeout_ms` when configured.
    pub async fn read_new<J: DeserializeOwned>(
        &self,
        count: usize,
    ) -> Result<ReadBatch<J>, StreamError> {
        let mut conn = self.redis.clone();

        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id);

        if let Some(timeout) = self.config.blocking_timeout_ms {
            cmd.arg("BLOCK").arg(timeout);
        }

        cmd.arg("COUNT")
            .arg(count)
            .arg("STREAMS")
            .arg(&self.config.stream_name)
            .arg(">");

        // nil on BLOCK timeout
        let reply: Option<ReadReply> = cmd.query_async(&mut conn).await?;

        Ok(reply
            .map(|r| Self::parse_reply(r, Delivery::New))
            .unwrap_or_else(ReadBatch::empty))
    }

    pub async fn ack(&self, stream_id: &str) -> Result<(), StreamError> {
        let mut conn = self.redis.clone();

        let _: i64 = conn
            .xack(
                &self.config.stream_name,
                &self.config.consumer_group,
                &[stream_id],
            )
            .await?;

        debug!(stream_id = %stream_id, "Acknowledged message");
        Ok(())
    }

    /// Takes over entries other consumers left pending for longer than
    /// `claim_timeout_ms`.
    pub async fn claim_abandoned<J: DeserializeOwned>(
        &self,
        count: usize,
    ) -> Result<ReadBatch<J>, StreamError> {
        let mut conn = self.redis.clone();

        // (id, consumer, idle ms, delivery count)
        let pending: Vec<(String, String, u64, u64)> = redis::cmd("XPENDING")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("-")
            .arg("+")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let candidates: HashMap<String, u64> = pending
            .into_iter()
            .filter(|(_, consumer, idle, _)| {
                consumer != &self.config.consumer_id && *idle >= self.config.claim_timeout_ms
            })
            .map(|(id, _, _, deliveries)| (id, deliveries))
            .collect();

        if candidates.is_empty() {
            return Ok(ReadBatch::empty());
        }

        let mut cmd = redis::cmd("XCLAIM");
        cmd.arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.config.consumer_id)
            .arg(self.config.claim_timeout_ms);
        for id in candidates.keys() {
            cmd.arg(id);
        }

        let entries: Vec<RawEntry> = cmd.query_async(&mut conn).await?;

        let mut batch = ReadBatch::empty();
        for (stream_id, fields) in entries {
            let delivery = Delivery::Claimed {
                delivery_count: candidates.get(&stream_id).copied().unwrap_or(1) + 1,
            };
            Self::push_entry(&mut batch, stream_id, fields, delivery);
        }

        if !batch.is_empty() {
            warn!(
                count = batch.len(),
                stream = %self.config.stream_name,
                "Claimed abandoned messages"
            );
        }

        Ok(batch)
    }

    pub async fn stream_info(&self) -> Result<StreamInfo, StreamError> {
        let mut conn = self.redis.clone();

        let length: i64 = conn.xlen(&self.config.stream_name).await?;

        let (pending_count, _, _, _): (
            i64,
            Option<String>,
            Option<String>,
            Option<Vec<(String, String)>>,
        ) = redis::cmd("XPENDING")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .query_async(&mut conn)
            .await?;

        Ok(StreamInfo {
            stream_name: self.config.stream_name.clone(),
            consumer_group: self.config.consumer_group.clone(),
            length,
            pending_count,
        })
    }

    fn parse_reply<J: DeserializeOwned>(reply: ReadReply, delivery: Delivery) -> ReadBatch<J> {
        let mut batch = ReadBatch::empty();

        for (_stream_name, entries) in reply {
            for (stream_id, fields) in entries {
                Self::push_entry(&mut batch, stream_id, fields, delivery);
            }
        }

        batch
    }

    fn push_entry<J: DeserializeOwned>(
        batch: &mut ReadBatch<J>,
        stream_id: String,
        fields: Option<HashMap<String, String>>,
        delivery: Delivery,
    ) {
        let Some(fields) = fields else {
            warn!(stream_id = %stream_id, "Pending entry no longer in stream");
            batch.malformed.push(stream_id);
            return;
        };

        let Some(json) = fields.get(MessageKey::Job.as_ref()) else {
            error!(
                stream_id = %stream_id,
                fields = ?fields.keys().collect::<Vec<_>>(),
                "Missing 'job' field in message"
            );
            batch.malformed.push(stream_id);
            return;
        };

        match serde_json::from_str::<J>(json) {
            Ok(job) => batch
                .events
                .push(StreamEvent::with_delivery(stream_id, job, delivery)),
            Err(e) => {
                error!(stream_id = %stream_id, error = %e, "Failed to decode job payload");
                batch.malformed.push(stream_id);
            }
        }
    }
}
