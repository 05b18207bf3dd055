//! Notification Service
//!
//! Consumes user lifecycle events from a Redis stream and serves the
//! notifications HTTP API from the same process.
//!
//! ## Architecture
//!
//! ```text
//! Redis Stream (user-events)
//!   ↓ (Consumer Group: notification-group)
//! StreamWorker<UserEvent, UserEventDispatcher>
//!   ↓
//! NotificationService ──► SmtpTransport
//!   ↑
//! HTTP API (/api/notifications/*)
//! ```
//!
//! ## Endpoints
//!
//! - `POST /api/notifications/email`, `POST /api/notifications/welcome`
//! - `GET /api/notifications/health`
//! - `GET /ready`: mail transport connection check
//! - `GET /metrics`: Prometheus metrics
//! - `GET /swagger-ui`: API documentation

pub mod config;
pub mod openapi;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{create_app_with_shutdown, create_router, shutdown_signal};
use config::Config;
use domain_notifications::{NotificationService, SmtpTransport, UserEventDispatcher};
use eyre::{Result, WrapErr};
use redis::aio::ConnectionManager;
use serde_json::json;
use std::sync::Arc;
use stream_worker::{StreamWorker, init_metrics, render_metrics};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// HTTP surface: the notifications API under `/api/notifications`, plus
/// `/ready` and `/metrics`.
pub fn app_router(service: Arc<NotificationService>) -> Router {
    let api_routes = Router::new().nest(
        "/notifications",
        domain_notifications::router(service.clone()),
    );

    create_router::<openapi::ApiDoc>(api_routes).merge(ops_router(service))
}

fn ops_router(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(service)
}

async fn ready(State(service): State<Arc<NotificationService>>) -> impl IntoResponse {
    if service.check_connection().await {
        (
            StatusCode::OK,
            Json(json!({ "status": "ready", "mailTransport": "up" })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "mailTransport": "down" })),
        )
    }
}

async fn metrics() -> String {
    render_metrics()
}

async fn connect_redis(uri: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(uri).wrap_err("Invalid Redis URL")?;
    ConnectionManager::new(client)
        .await
        .wrap_err("Failed to connect to Redis")
}

/// Run the notification service
///
/// 1. Loads configuration and sets up tracing and metrics
/// 2. Builds the SMTP transport and the notification service
/// 3. Starts the HTTP API and the `user-events` stream worker
/// 4. On Ctrl+C / SIGTERM, stops both after in-flight work completes
///
/// # Errors
///
/// Returns an error if configuration is invalid, Redis is unreachable, the
/// HTTP listener cannot bind, or the worker hits a fatal error.
pub async fn run() -> Result<()> {
    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    core_config::tracing::init_tracing(&config.environment);
    init_metrics().wrap_err("Failed to initialize metrics")?;

    info!(environment = ?config.environment, "Starting notification service");

    let transport = SmtpTransport::new(config.smtp.clone())
        .wrap_err("Failed to build SMTP transport")?;
    let service = Arc::new(NotificationService::new(
        &config.notification,
        Arc::new(transport),
    ));

    if !service.check_connection().await {
        warn!(
            host = %config.smtp.host,
            port = config.smtp.port,
            "Mail server not reachable at startup; sends will fail until it is"
        );
    }

    info!("Connecting to Redis...");
    let redis = connect_redis(&config.redis.uri).await?;
    info!("Connected to Redis successfully");

    let worker_config = config.worker_config();
    info!(
        stream = %worker_config.stream_name,
        consumer_group = %worker_config.consumer_group,
        consumer_id = %worker_config.consumer_id,
        max_concurrent_jobs = worker_config.max_concurrent_jobs,
        "Worker configuration loaded"
    );
    let worker = StreamWorker::new(
        redis,
        UserEventDispatcher::new(service.clone()),
        worker_config,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let router = app_router(service);
    let server_config = config.server.clone();
    let mut server_shutdown = shutdown_rx.clone();
    let mut server = tokio::spawn(async move {
        create_app_with_shutdown(router, &server_config, async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await
    });

    let worker_run = worker.run(shutdown_rx);
    tokio::pin!(worker_run);

    tokio::select! {
        result = &mut worker_run => {
            result.wrap_err("Stream worker failed")?;
            server
                .await
                .wrap_err("HTTP server task failed")?
                .wrap_err("HTTP server failed")?;
        }
        result = &mut server => {
            if let Err(e) = result.wrap_err("HTTP server task failed")?
                .wrap_err("HTTP server failed")
            {
                error!(error = %e, "HTTP server stopped, shutting down");
                return Err(e);
            }
            worker_run.await.wrap_err("Stream worker failed")?;
        }
    }

    info!("Notification service shutdown complete");
    Ok(())
}
