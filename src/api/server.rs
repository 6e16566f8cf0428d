use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    metrics,
    models::{DimensionFilter, MetricDataResult, MetricDescriptor, Resource},
    MetricsAdapter, MetricsAdapterError, MetricsClient, Result,
};

pub struct AppState<C> {
    pub adapter: Arc<MetricsAdapter<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMetricsBody {
    pub namespace: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionFilter>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMetricsReply {
    pub metrics: Vec<MetricDescriptor>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricDataBody {
    pub resources: Vec<Resource>,
    pub metric: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period: u32,
    pub stat: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl MetricDataBody {
    fn validate(&self) -> Result<()> {
        if self.resources.is_empty() {
            return Err(MetricsAdapterError::InvalidRequest(
                "at least one resource is required".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(MetricsAdapterError::InvalidRequest(format!(
                "start ({}) is after end ({})",
                self.start, self.end
            )));
        }
        if self.period == 0 {
            return Err(MetricsAdapterError::InvalidRequest(
                "period must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn router<C: MetricsClient + 'static>(adapter: Arc<MetricsAdapter<C>>) -> Router {
    Router::new()
        .route("/metrics/list", post(list_metrics::<C>))
        .route("/metrics/data", post(get_metric_data::<C>))
        .route("/metrics", get(prometheus_metrics))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { adapter })
}

async fn list_metrics<C: MetricsClient + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<ListMetricsBody>,
) -> Result<Json<ListMetricsReply>> {
    info!("Listing metrics of namespace {}", body.namespace);

    let metrics = state
        .adapter
        .list_metrics(&body.namespace, &body.dimensions)
        .await?;

    Ok(Json(ListMetricsReply { metrics }))
}

async fn get_metric_data<C: MetricsClient + 'static>(
    State(state): State<AppState<C>>,
    Json(body): Json<MetricDataBody>,
) -> Result<Json<MetricDataResult>> {
    body.validate()?;
    info!(
        "Getting {} ({}, {}s) for {} resources",
        body.metric,
        body.stat,
        body.period,
        body.resources.len()
    );

    let data = state
        .adapter
        .get_metric_data(
            &body.resources,
            &body.metric,
            body.start,
            body.end,
            body.period,
            &body.stat,
            body.limit,
        )
        .await?;

    Ok(Json(data))
}

async fn prometheus_metrics() -> Result<impl IntoResponse> {
    let text = metrics::gather_text()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves the facade on `addr` until the process is stopped.
pub async fn serve<C: MetricsClient + 'static>(
    addr: &str,
    adapter: Arc<MetricsAdapter<C>>,
) -> Result<()> {
    let app = router(adapter);
    info!("Starting metrics adapter on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        MetricsAdapterError::Internal(format!("Failed to bind to address: {}", e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MetricsAdapterError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
