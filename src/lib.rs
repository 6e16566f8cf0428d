pub mod adapter;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;

pub use adapter::MetricsAdapter;
pub use client::{HttpMetricsClient, MetricsClient};
pub use config::AdapterConfig;
pub use error::{MetricsAdapterError, Result};
