//! User events flowing through a real Redis stream into the dispatcher.
//!
//! Run with: `cargo test -p domain_notifications -- --ignored`

use domain_notifications::{
    InMemoryTransport, NotificationConfig, NotificationService, UserEvent, UserEventDispatcher,
    UserEventType, composer::ACCOUNT_DELETED_SUBJECT,
};
use redis::AsyncCommands;
use std::sync::Arc;
use stream_worker::{StreamConsumer, StreamProducer, StreamWorker, WorkerConfig};
use test_utils::{TestNames, TestRedis};

struct Harness {
    redis: TestRedis,
    config: WorkerConfig,
    transport: InMemoryTransport,
    worker: StreamWorker<UserEvent, UserEventDispatcher>,
    producer: StreamProducer,
}

impl Harness {
    async fn start() -> Self {
        let redis = TestRedis::new().await;
        let names = TestNames::random();
        let config = WorkerConfig::new(names.stream("user-events"), names.group("notification"))
            .with_consumer_id(names.consumer("a"))
            .with_blocking(None);

        let transport = InMemoryTransport::new();
        let service = NotificationService::new(
            &NotificationConfig::new("no-reply@example.com", "https://site.test"),
            Arc::new(transport.clone()),
        );
        let worker = StreamWorker::new(
            redis.connection_manager().await,
            UserEventDispatcher::new(Arc::new(service)),
            config.clone(),
        );
        worker.consumer().init_consumer_group().await.unwrap();

        let producer = StreamProducer::new(redis.connection_manager().await, &config.stream_name);

        Self {
            redis,
            config,
            transport,
            worker,
            producer,
        }
    }

    async fn pending(&self) -> i64 {
        let consumer = StreamConsumer::new(self.redis.connection_manager().await, self.config.clone());
        consumer.stream_info().await.unwrap().pending_count
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_user_created_is_sent_and_acknowledged() {
    let harness = Harness::start().await;
    harness
        .producer
        .send(&UserEvent::user_created("a@b.com", "Ann"))
        .await
        .unwrap();

    harness.worker.process_batch(true).await.unwrap();

    assert_eq!(harness.transport.sent_count(), 1);
    assert_eq!(harness.transport.last().unwrap().to, "a@b.com");
    assert_eq!(harness.pending().await, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_failed_send_is_redelivered() {
    let harness = Harness::start().await;
    harness.transport.fail_with("SMTP timeout");
    harness
        .producer
        .send(&UserEvent::user_deleted("a@b.com", "Ann"))
        .await
        .unwrap();

    harness.worker.process_batch(true).await.unwrap();
    assert_eq!(harness.transport.sent_count(), 0);
    assert_eq!(harness.pending().await, 1);

    harness.transport.recover();
    harness.worker.process_batch(true).await.unwrap();

    assert_eq!(harness.transport.sent_count(), 1);
    assert_eq!(harness.transport.last().unwrap().subject, ACCOUNT_DELETED_SUBJECT);
    assert_eq!(harness.pending().await, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_unrecognized_event_is_acknowledged_without_mail() {
    let harness = Harness::start().await;
    harness
        .producer
        .send(&UserEvent::new(
            UserEventType::Unrecognized("USER_UPDATED".into()),
            "a@b.com",
            "Ann",
        ))
        .await
        .unwrap();

    harness.worker.process_batch(true).await.unwrap();

    assert_eq!(harness.transport.sent_count(), 0);
    assert_eq!(harness.pending().await, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_undecodable_entry_is_acknowledged() {
    let harness = Harness::start().await;
    let mut conn = harness.redis.connection_manager().await;
    let _: String = conn
        .xadd(&harness.config.stream_name, "*", &[("job", "{not json")])
        .await
        .unwrap();

    harness.worker.process_batch(true).await.unwrap();

    assert_eq!(harness.transport.sent_count(), 0);
    assert_eq!(harness.pending().await, 0);
}
