use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{MetricsAdapterError, Result};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub fn default_filter() -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), Level::INFO)
}

/// Sets up the logging subscriber for the process.
///
/// `json` switches the output to one JSON object per line, which is what the
/// log shippers in front of the monitoring layer expect.
pub fn init_logger(json: bool) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| MetricsAdapterError::Internal(format!("Failed to initialize logger: {}", e)))
}
