//! Decoded stream entry plus its delivery metadata

use chrono::{DateTime, Utc};

/// How an entry reached this consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// First delivery (`XREADGROUP ... >`).
    New,
    /// Re-read from this consumer's own pending list (`XREADGROUP ... 0`).
    Pending,
    /// Taken over from an idle consumer (`XCLAIM`), with the group's delivery count.
    Claimed { delivery_count: u64 },
}

#[derive(Debug, Clone)]
pub struct StreamEvent<J> {
    /// Redis stream entry ID (e.g., "1234567890123-0")
    pub stream_id: String,
    pub job: J,
    /// Parsed from the millisecond part of the entry ID
    pub timestamp: DateTime<Utc>,
    pub delivery: Delivery,
}

impl<J> StreamEvent<J> {
    pub fn new(stream_id: String, job: J) -> Self {
        Self::with_delivery(stream_id, job, Delivery::New)
    }

    pub fn with_delivery(stream_id: String, job: J, delivery: Delivery) -> Self {
        let timestamp = Self::parse_timestamp(&stream_id);
        Self {
            stream_id,
            job,
            timestamp,
            delivery,
        }
    }

    /// Stream IDs are "timestamp_ms-sequence"
    fn parse_timestamp(stream_id: &str) -> DateTime<Utc> {
        stream_id
            .split('-')
            .next()
            .and_then(|ts| ts.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now)
    }

    pub fn is_redelivery(&self) -> bool {
        !matches!(self.delivery, Delivery::New)
    }

    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.timestamp).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        let now_ms = Utc::now().timestamp_millis();
        let event = StreamEvent::new(format!("{}-0", now_ms), ());

        assert_eq!(event.timestamp.timestamp_millis(), now_ms);
        assert!(event.age_ms() < 1000);
        assert!(!event.is_redelivery());
    }

    #[test]
    fn test_known_stream_id_timestamp() {
        let event = StreamEvent::new("1700000000000-3".to_string(), ());
        assert_eq!(event.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_redelivery() {
        let pending = StreamEvent::with_delivery("1-0".to_string(), (), Delivery::Pending);
        let claimed = StreamEvent::with_delivery(
            "1-0".to_string(),
            (),
            Delivery::Claimed { delivery_count: 3 },
        );

        assert!(pending.is_redelivery());
        assert!(claimed.is_redelivery());
    }
}
