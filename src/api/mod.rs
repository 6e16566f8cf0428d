//! JSON facade exposing the adapter to the monitoring layer.

mod server;

pub use server::{router, serve, AppState, ListMetricsBody, ListMetricsReply, MetricDataBody};
