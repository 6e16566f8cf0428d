use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{
    GetMetricDataRequest, GetMetricDataResponse, GetMetricStatisticsRequest,
    GetMetricStatisticsResponse, ListMetricsPage, ListMetricsRequest, MetricsClient,
};
use crate::{config::AdapterConfig, MetricsAdapterError, Result};

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "GraniteServiceVersion20100801";

/// Error document returned alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type", default)]
    code: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// [`MetricsClient`] speaking the service's JSON protocol over HTTP.
///
/// The wrapped `reqwest::Client` is expected to be ready to use: credentials
/// (default headers, a signing proxy in front of `endpoint`, ...) are not
/// handled here.
#[derive(Debug, Clone)]
pub struct HttpMetricsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetricsClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MetricsAdapterError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)?;
        debug!("[{}] POST {} ({} bytes)", operation, self.endpoint, body.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(TARGET_HEADER, format!("{}.{}", TARGET_PREFIX, operation))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error: ServiceErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let code = error
                .code
                .as_deref()
                .and_then(|code| code.rsplit('#').next())
                .unwrap_or("Unknown")
                .to_string();
            return Err(MetricsAdapterError::Service {
                status: status.as_u16(),
                code,
                message: error
                    .message
                    .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned()),
            });
        }

        if bytes.is_empty() {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl MetricsClient for HttpMetricsClient {
    async fn list_metrics(&self, request: ListMetricsRequest) -> Result<ListMetricsPage> {
        self.call("ListMetrics", &request).await
    }

    async fn get_metric_statistics(
        &self,
        request: GetMetricStatisticsRequest,
    ) -> Result<GetMetricStatisticsResponse> {
        self.call("GetMetricStatistics", &request).await
    }

    async fn get_metric_data(&self, request: GetMetricDataRequest) -> Result<GetMetricDataResponse> {
        self.call("GetMetricData", &request).await
    }
}
