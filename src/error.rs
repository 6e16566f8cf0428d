use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsAdapterError {
    /// The metrics service answered with a non-success status.
    #[error("Service error ({status}) {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for MetricsAdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MetricsAdapterError::Serialization(err.to_string())
        } else {
            MetricsAdapterError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MetricsAdapterError {
    fn from(err: serde_json::Error) -> Self {
        MetricsAdapterError::Serialization(err.to_string())
    }
}

impl MetricsAdapterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MetricsAdapterError::Service { .. } | MetricsAdapterError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            MetricsAdapterError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            MetricsAdapterError::Serialization(_)
            | MetricsAdapterError::Config(_)
            | MetricsAdapterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MetricsAdapterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!("Request failed with {}: {}", status, self);

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MetricsAdapterError>;
