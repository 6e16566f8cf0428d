//! Translation between the resource/metric model of the monitoring layer and
//! the metrics service's query dialect.

use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::{
    client::{
        Datapoint, GetMetricDataRequest, GetMetricStatisticsRequest, ListMetricsRequest, Metric,
        MetricDataQuery, MetricDataSeries, MetricStat, MetricsClient, ScanBy, NO_UNIT, SAMPLE_COUNT,
    },
    config::UnitLookup,
    metrics::{record_dropped_series, record_skipped_resource, CallTimer},
    models::{Dimension, DimensionFilter, MetricDataResult, MetricDescriptor, MetricKey, Resource},
    MetricsAdapterError, Result,
};

const QUERY_ID_PREFIX: &str = "metric_";
const QUERY_ID_SUFFIX_LEN: usize = 12;

/// Stateless adapter around an injected [`MetricsClient`].
///
/// Every operation issues its service calls one after the other and returns
/// the first client error as is.
#[derive(Debug, Clone)]
pub struct MetricsAdapter<C> {
    client: C,
    unit_lookup: UnitLookup,
}

impl<C: MetricsClient> MetricsAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            unit_lookup: UnitLookup::default(),
        }
    }

    pub fn with_unit_lookup(mut self, unit_lookup: UnitLookup) -> Self {
        self.unit_lookup = unit_lookup;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Lists the whole catalog of `namespace`, following pagination tokens
    /// until the service stops returning one.
    ///
    /// Each metric costs one extra statistics call to guess its unit. That
    /// call only carries the filters pinned to a value.
    pub async fn list_metrics(
        &self,
        namespace: &str,
        dimension_filters: &[DimensionFilter],
    ) -> Result<Vec<MetricDescriptor>> {
        let unit_dimensions: Vec<Dimension> = dimension_filters
            .iter()
            .filter_map(DimensionFilter::to_dimension)
            .collect();
        let mut descriptors = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let request = ListMetricsRequest {
                namespace: namespace.to_string(),
                dimensions: dimension_filters.to_vec(),
                next_token: next_token.take(),
            };
            let page = timed("ListMetrics", self.client.list_metrics(request)).await?;
            debug!(
                "[list_metrics] {} metrics in page (more: {})",
                page.metrics.len(),
                page.next_token.is_some()
            );

            for metric in page.metrics {
                let key = MetricKey {
                    namespace: namespace.to_string(),
                    metric_name: metric.metric_name,
                };
                let unit = self
                    .metric_unit(&key.namespace, &unit_dimensions, &key.metric_name)
                    .await?;
                descriptors.push(MetricDescriptor::new(&key, unit));
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(descriptors)
    }

    /// Fetches `metric_key` for every resource monitored in its namespace with
    /// a single batched call, then lines the series up under one set of
    /// timestamps.
    ///
    /// Resources without the namespace in their `monitoring_info` are left
    /// out, and series that cannot be matched back to a resource are dropped.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_metric_data(
        &self,
        resources: &[Resource],
        metric_key: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        period: u32,
        stat: &str,
        limit: Option<u32>,
    ) -> Result<MetricDataResult> {
        let key = MetricKey::parse(metric_key);
        let queries = build_queries(resources, &key, period, stat);
        let max_datapoints = limit.filter(|limit| *limit > 0);

        debug!("[get_metric_data] MetricDataQueries: {:?}", queries);
        debug!("[get_metric_data] StartTime: {}", start);
        debug!("[get_metric_data] EndTime: {}", end);
        debug!("[get_metric_data] MaxDatapoints: {:?}", max_datapoints);

        let request = GetMetricDataRequest {
            metric_data_queries: queries,
            start_time: start,
            end_time: end,
            scan_by: ScanBy::TimestampAscending,
            max_datapoints,
        };
        let response = timed("GetMetricData", self.client.get_metric_data(request)).await?;
        debug!(
            "[get_metric_data] {} series returned",
            response.metric_data_results.len()
        );

        Ok(assemble(resources, response.metric_data_results))
    }

    /// Best-effort unit of a metric: the first real unit reported by its
    /// recent sample counts, or an empty string.
    async fn metric_unit(
        &self,
        namespace: &str,
        dimensions: &[Dimension],
        metric_name: &str,
    ) -> Result<String> {
        let lookback = chrono::Duration::from_std(self.unit_lookup.lookback).map_err(|e| {
            MetricsAdapterError::Internal(format!("Unit lookback out of range: {}", e))
        })?;
        let end = Utc::now();
        let start = end.checked_sub_signed(lookback).ok_or_else(|| {
            MetricsAdapterError::Internal(format!(
                "Unit lookback of {}s reaches before the earliest representable time",
                self.unit_lookup.lookback.as_secs()
            ))
        })?;

        let request = GetMetricStatisticsRequest {
            namespace: namespace.to_string(),
            metric_name: metric_name.to_string(),
            dimensions: dimensions.to_vec(),
            start_time: start,
            end_time: end,
            period: self.unit_lookup.period_secs,
            statistics: vec![SAMPLE_COUNT.to_string()],
        };
        let response = timed("GetMetricStatistics", self.client.get_metric_statistics(request)).await?;

        Ok(first_unit(&response.datapoints))
    }
}

async fn timed<T, F>(operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timer = CallTimer::new(operation);
    let result = call.await;
    if result.is_err() {
        timer.fail();
    }
    result
}

pub(crate) fn first_unit(datapoints: &[Datapoint]) -> String {
    datapoints
        .iter()
        .filter_map(|datapoint| datapoint.unit.as_deref())
        .find(|unit| *unit != NO_UNIT)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn build_queries(
    resources: &[Resource],
    key: &MetricKey,
    period: u32,
    stat: &str,
) -> Vec<MetricDataQuery> {
    let mut ids = HashSet::new();
    let mut queries = Vec::with_capacity(resources.len());

    for resource in resources {
        let Some(dimensions) = resource.query_dimensions(key) else {
            debug!(
                "[get_metric_data] {} is not monitored in namespace '{}'",
                resource.resource_id, key.namespace
            );
            record_skipped_resource();
            continue;
        };

        queries.push(MetricDataQuery {
            id: unique_query_id(&mut ids),
            metric_stat: MetricStat {
                metric: Metric {
                    namespace: key.namespace.clone(),
                    metric_name: key.metric_name.clone(),
                    dimensions: dimensions.to_vec(),
                },
                period,
                stat: stat.to_string(),
            },
        });
    }

    queries
}

fn unique_query_id(taken: &mut HashSet<String>) -> String {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}{}", QUERY_ID_PREFIX, &suffix[..QUERY_ID_SUFFIX_LEN]);
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// First resource owning a dimension whose value equals `label`.
pub(crate) fn resolve_resource_id<'a>(resources: &'a [Resource], label: &str) -> Option<&'a str> {
    resources
        .iter()
        .find(|resource| resource.has_dimension_value(label))
        .map(|resource| resource.resource_id.as_str())
}

pub(crate) fn assemble(resources: &[Resource], series: Vec<MetricDataSeries>) -> MetricDataResult {
    let mut result = MetricDataResult::default();

    for data in series {
        let resource_id = if resources.len() == 1 {
            Some(resources[0].resource_id.as_str())
        } else {
            data.label
                .as_deref()
                .and_then(|label| resolve_resource_id(resources, label))
        };

        if result.labels.is_empty() {
            result.labels = data.timestamps.iter().map(to_iso8601).collect();
        }

        match resource_id {
            Some(id) => {
                result.resource_values.insert(id.to_string(), data.values);
            }
            None => {
                debug!(
                    "[get_metric_data] dropping series {:?} (label {:?}): no matching resource",
                    data.id, data.label
                );
                record_dropped_series();
            }
        }
    }

    result
}

pub(crate) fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
