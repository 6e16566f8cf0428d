use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{MetricsAdapterError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://monitoring.us-east-1.amazonaws.com";
pub const DEFAULT_PORT: u16 = 8080;

/// The service keeps statistics for 455 days; older windows return nothing.
pub const MAX_UNIT_LOOKBACK_SECS: u64 = 455 * 24 * 60 * 60;

/// Window and bucket width used to look up a metric's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLookup {
    pub lookback: Duration,
    pub period_secs: u32,
}

impl Default for UnitLookup {
    fn default() -> Self {
        Self {
            lookback: Duration::from_secs(60 * 60),
            period_secs: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
    pub unit_lookup: UnitLookup,
    pub port: u16,
    pub log_json: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(30),
            unit_lookup: UnitLookup::default(),
            port: DEFAULT_PORT,
            log_json: false,
        }
    }
}

impl AdapterConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; unset keys keep
    /// their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let endpoint = lookup("METRICS_ENDPOINT")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.endpoint);

        let request_timeout = parse_var(&lookup, "METRICS_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let lookback = parse_var(&lookup, "METRICS_UNIT_LOOKBACK_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.unit_lookup.lookback);
        if lookback.as_secs() > MAX_UNIT_LOOKBACK_SECS {
            return Err(MetricsAdapterError::Config(format!(
                "METRICS_UNIT_LOOKBACK_SECS must be at most {}",
                MAX_UNIT_LOOKBACK_SECS
            )));
        }

        let period_secs = parse_var(&lookup, "METRICS_UNIT_PERIOD_SECS")?
            .unwrap_or(defaults.unit_lookup.period_secs);
        if period_secs == 0 {
            return Err(MetricsAdapterError::Config(
                "METRICS_UNIT_PERIOD_SECS must be greater than 0".to_string(),
            ));
        }

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        let log_json = match lookup("LOG_FORMAT") {
            None => defaults.log_json,
            Some(format) => match format.trim().to_ascii_lowercase().as_str() {
                "json" => true,
                "text" | "compact" | "" => false,
                other => {
                    return Err(MetricsAdapterError::Config(format!(
                        "Invalid value for LOG_FORMAT: '{}' (expected json or text)",
                        other
                    )))
                }
            },
        };

        Ok(Self {
            endpoint,
            request_timeout,
            unit_lookup: UnitLookup {
                lookback,
                period_secs,
            },
            port,
            log_json,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            MetricsAdapterError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e))
        }),
    }
}
