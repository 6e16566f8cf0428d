#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use metrics_adapter::{
    client::{
        Datapoint, GetMetricDataRequest, GetMetricDataResponse, GetMetricStatisticsRequest,
        GetMetricStatisticsResponse, ListMetricsPage, ListMetricsRequest, MetricDataSeries,
        MetricEntry, MetricsClient,
    },
    models::{Dimension, DimensionFilter, MonitoringInfo, NamespaceDimensions, Resource},
    MetricsAdapterError, Result,
};

/// In-memory metrics service recording every request it receives.
#[derive(Default)]
pub struct FakeClient {
    pub catalog_pages: Vec<Vec<String>>,
    pub units: HashMap<String, Vec<Option<String>>>,
    pub series: Vec<MetricDataSeries>,
    pub fail_statistics: bool,
    pub fail_data: bool,

    pub list_requests: Mutex<Vec<ListMetricsRequest>>,
    pub statistics_requests: Mutex<Vec<GetMetricStatisticsRequest>>,
    pub data_requests: Mutex<Vec<GetMetricDataRequest>>,
}

impl FakeClient {
    pub fn with_catalog(pages: &[&[&str]]) -> Self {
        Self {
            catalog_pages: pages
                .iter()
                .map(|page| page.iter().map(|name| name.to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_series(series: Vec<MetricDataSeries>) -> Self {
        Self {
            series,
            ..Self::default()
        }
    }

    pub fn unit(mut self, metric_name: &str, units: &[Option<&str>]) -> Self {
        self.units.insert(
            metric_name.to_string(),
            units.iter().map(|u| u.map(str::to_string)).collect(),
        );
        self
    }

    pub fn last_data_request(&self) -> GetMetricDataRequest {
        self.data_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no GetMetricData request recorded")
    }
}

fn service_error(code: &str) -> MetricsAdapterError {
    MetricsAdapterError::Service {
        status: 400,
        code: code.to_string(),
        message: "rejected by fake".to_string(),
    }
}

#[async_trait]
impl MetricsClient for FakeClient {
    async fn list_metrics(&self, request: ListMetricsRequest) -> Result<ListMetricsPage> {
        self.list_requests.lock().unwrap().push(request.clone());

        let index = match request.next_token.as_deref() {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|i| i.parse::<usize>().ok())
                .ok_or_else(|| service_error("InvalidNextToken"))?,
        };

        let names = self.catalog_pages.get(index).cloned().unwrap_or_default();
        let next_token = if index + 1 < self.catalog_pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        Ok(ListMetricsPage {
            metrics: names
                .into_iter()
                .map(|metric_name| MetricEntry {
                    namespace: Some(request.namespace.clone()),
                    metric_name,
                    dimensions: request
                        .dimensions
                        .iter()
                        .filter_map(DimensionFilter::to_dimension)
                        .collect(),
                })
                .collect(),
            next_token,
        })
    }

    async fn get_metric_statistics(
        &self,
        request: GetMetricStatisticsRequest,
    ) -> Result<GetMetricStatisticsResponse> {
        self.statistics_requests.lock().unwrap().push(request.clone());
        if self.fail_statistics {
            return Err(service_error("AccessDenied"));
        }

        let datapoints = self
            .units
            .get(&request.metric_name)
            .map(|units| {
                units
                    .iter()
                    .map(|unit| Datapoint {
                        sample_count: Some(1.0),
                        unit: unit.clone(),
                        ..Datapoint::default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(GetMetricStatisticsResponse {
            label: Some(request.metric_name),
            datapoints,
        })
    }

    async fn get_metric_data(&self, request: GetMetricDataRequest) -> Result<GetMetricDataResponse> {
        self.data_requests.lock().unwrap().push(request);
        if self.fail_data {
            return Err(service_error("InvalidParameterCombination"));
        }

        Ok(GetMetricDataResponse {
            metric_data_results: self.series.clone(),
        })
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn series(label: &str, timestamps: &[i64], values: &[f64]) -> MetricDataSeries {
    MetricDataSeries {
        id: None,
        label: Some(label.to_string()),
        timestamps: timestamps.iter().map(|t| at(*t)).collect(),
        values: values.to_vec(),
        status_code: Some("Complete".to_string()),
    }
}

/// A resource identified by one `InstanceId` dimension and monitored in
/// `namespace` through its `DEFAULT` entry.
pub fn ec2_resource(resource_id: &str, instance_id: &str, namespace: &str) -> Resource {
    let dimensions = vec![Dimension::new("InstanceId", instance_id)];
    let mut entry = HashMap::new();
    entry.insert("DEFAULT".to_string(), dimensions.clone());
    let mut info = HashMap::new();
    info.insert(namespace.to_string(), NamespaceDimensions(entry));

    Resource {
        resource_id: resource_id.to_string(),
        dimensions,
        monitoring_info: MonitoringInfo(info),
    }
}
