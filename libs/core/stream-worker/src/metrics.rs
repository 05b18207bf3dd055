//! Prometheus metrics for stream workers

use crate::error::{ErrorCategory, StreamError};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;
use tracing::info;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Subsequent calls are no-ops.
pub fn init_metrics() -> Result<(), StreamError> {
    PROMETHEUS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| StreamError::Config(format!("Prometheus recorder: {e}")))?;
        info!("Prometheus metrics initialized");
        Ok::<_, StreamError>(handle)
    })?;
    Ok(())
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render metrics in Prometheus text format (empty before `init_metrics`)
pub fn render_metrics() -> String {
    prometheus_handle().map(|h| h.render()).unwrap_or_default()
}

/// Per-stream, per-processor metric labels
#[derive(Clone)]
pub struct StreamMetrics {
    stream_name: String,
    processor_name: String,
}

impl StreamMetrics {
    pub fn new(stream_name: impl Into<String>, processor_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            processor_name: processor_name.into(),
        }
    }

    pub fn job_received(&self) {
        counter!(
            "stream_worker_jobs_received_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    pub fn job_processed(&self, duration: Duration) {
        counter!(
            "stream_worker_jobs_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "success"
        )
        .increment(1);

        histogram!(
            "stream_worker_job_duration_seconds",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    pub fn job_failed(&self, category: ErrorCategory) {
        counter!(
            "stream_worker_jobs_processed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "status" => "failed"
        )
        .increment(1);

        counter!(
            "stream_worker_job_errors_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone(),
            "category" => category.as_str()
        )
        .increment(1);
    }

    /// Undecodable entry acknowledged and dropped
    pub fn job_discarded(&self) {
        counter!(
            "stream_worker_jobs_discarded_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(1);
    }

    pub fn message_claimed(&self, count: usize) {
        counter!(
            "stream_worker_messages_claimed_total",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .increment(count as u64);
    }

    pub fn stream_depth(&self, depth: i64) {
        gauge!(
            "stream_worker_stream_depth",
            "stream" => self.stream_name.clone()
        )
        .set(depth as f64);
    }

    pub fn pending_count(&self, count: i64) {
        gauge!(
            "stream_worker_pending_count",
            "stream" => self.stream_name.clone(),
            "processor" => self.processor_name.clone()
        )
        .set(count as f64);
    }
}
