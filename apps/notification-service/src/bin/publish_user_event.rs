//! Pushes a user event onto the stream for local testing
//!
//! Run with: cargo run -p notification_service --bin publish_user_event -- --email ann@example.com --name Ann

use clap::Parser;
use domain_notifications::{UserEvent, UserEventStream, UserEventType};
use eyre::{Result, WrapErr};
use stream_worker::{StreamDef, StreamProducer};

#[derive(Parser, Debug)]
#[command(about = "Publish a user event to the notification stream")]
struct Args {
    /// Event type tag, e.g. USER_CREATED or USER_DELETED
    #[arg(long = "type", default_value = "USER_CREATED")]
    event_type: String,

    #[arg(long)]
    email: String,

    #[arg(long, default_value = "")]
    name: String,

    /// Redis URL; falls back to REDIS_HOST
    #[arg(long, env = "REDIS_HOST", default_value = "redis://localhost:6379")]
    redis: String,

    #[arg(long, default_value = UserEventStream::STREAM_NAME)]
    stream: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    println!("Connecting to Redis at {}", args.redis);
    let client = redis::Client::open(args.redis.as_str()).wrap_err("Invalid Redis URL")?;
    let redis = redis::aio::ConnectionManager::new(client)
        .await
        .wrap_err("Failed to connect to Redis")?;

    let event = UserEvent::new(UserEventType::from(args.event_type), args.email, args.name);
    let producer = StreamProducer::new(redis, &args.stream);
    let stream_id = producer.send(&event).await?;

    println!("Published {} for {} to {}", event.event_type, event.email, args.stream);
    println!("Stream ID: {}", stream_id);

    Ok(())
}
