//! Metrics service boundary.
//!
//! Request and response shapes mirror the read-only subset of the
//! CloudWatch query API. The adapter only talks to the service through the
//! [`MetricsClient`] trait, so any transport (or an in-memory fake) can be
//! plugged in.

mod http;
pub mod timestamp;

pub use http::HttpMetricsClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Dimension, DimensionFilter};
use crate::Result;

/// Statistic used when looking up a metric's unit.
pub const SAMPLE_COUNT: &str = "SampleCount";

/// Unit reported by the service for unitless datapoints.
pub const NO_UNIT: &str = "None";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMetricsRequest {
    pub namespace: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMetricsPage {
    #[serde(default)]
    pub metrics: Vec<MetricEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// A catalog entry as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub metric_name: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMetricStatisticsRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    #[serde(with = "timestamp::epoch_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "timestamp::epoch_seconds")]
    pub end_time: DateTime<Utc>,
    pub period: u32,
    pub statistics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMetricStatisticsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub datapoints: Vec<Datapoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datapoint {
    #[serde(
        default,
        with = "timestamp::option_epoch_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricStat {
    pub metric: Metric,
    pub period: u32,
    pub stat: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDataQuery {
    pub id: String,
    pub metric_stat: MetricStat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanBy {
    #[default]
    TimestampAscending,
    TimestampDescending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMetricDataRequest {
    pub metric_data_queries: Vec<MetricDataQuery>,
    #[serde(with = "timestamp::epoch_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "timestamp::epoch_seconds")]
    pub end_time: DateTime<Utc>,
    pub scan_by: ScanBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_datapoints: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetMetricDataResponse {
    #[serde(default)]
    pub metric_data_results: Vec<MetricDataSeries>,
}

/// One returned time series, matching a query by `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDataSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, with = "timestamp::vec_epoch_seconds")]
    pub timestamps: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
}

/// Read-only access to a metrics service.
///
/// Implementations own transport, authentication and timeouts. Errors are
/// handed back to callers of the adapter untouched.
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Fetches one page of the metric catalog.
    async fn list_metrics(&self, request: ListMetricsRequest) -> Result<ListMetricsPage>;

    async fn get_metric_statistics(
        &self,
        request: GetMetricStatisticsRequest,
    ) -> Result<GetMetricStatisticsResponse>;

    /// Runs a batch of metric queries over one time window.
    async fn get_metric_data(&self, request: GetMetricDataRequest) -> Result<GetMetricDataResponse>;
}
