use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Instant;

use crate::{MetricsAdapterError, Result};

lazy_static! {
    // Service call metrics
    pub static ref SERVICE_CALLS: IntCounterVec = register_int_counter_vec!(
        "metrics_service_calls_total",
        "Total number of calls made to the metrics service",
        &["operation"]
    ).expect("metrics_service_calls_total registration");

    pub static ref SERVICE_CALL_FAILURES: IntCounterVec = register_int_counter_vec!(
        "metrics_service_call_failures_total",
        "Total number of failed calls to the metrics service",
        &["operation"]
    ).expect("metrics_service_call_failures_total registration");

    pub static ref SERVICE_CALL_DURATION: HistogramVec = register_histogram_vec!(
        "metrics_service_call_duration_seconds",
        "Metrics service call duration in seconds",
        &["operation"],
        vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]
    ).expect("metrics_service_call_duration_seconds registration");

    // Normalization metrics
    pub static ref SKIPPED_RESOURCES: IntCounter = register_int_counter!(
        "metrics_adapter_skipped_resources_total",
        "Resources left out of a batch because they are not monitored in the namespace"
    ).expect("metrics_adapter_skipped_resources_total registration");

    pub static ref DROPPED_SERIES: IntCounter = register_int_counter!(
        "metrics_adapter_dropped_series_total",
        "Returned series that could not be matched to a resource"
    ).expect("metrics_adapter_dropped_series_total registration");
}

/// Counts one service call and records its duration when dropped.
pub struct CallTimer {
    operation: &'static str,
    start: Instant,
}

impl CallTimer {
    pub fn new(operation: &'static str) -> Self {
        SERVICE_CALLS.with_label_values(&[operation]).inc();
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Marks the call as failed. The duration is still recorded.
    pub fn fail(&self) {
        SERVICE_CALL_FAILURES.with_label_values(&[self.operation]).inc();
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        SERVICE_CALL_DURATION
            .with_label_values(&[self.operation])
            .observe(duration);
    }
}

pub fn record_skipped_resource() {
    SKIPPED_RESOURCES.inc();
}

pub fn record_dropped_series() {
    DROPPED_SERIES.inc();
}

/// Renders every registered collector in the Prometheus text format.
pub fn gather_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| MetricsAdapterError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| MetricsAdapterError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
