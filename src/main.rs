use std::sync::Arc;

use metrics_adapter::{api, logging, AdapterConfig, HttpMetricsClient, MetricsAdapter};

#[tokio::main]
async fn main() {
    let config = match AdapterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_logger(config.log_json) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: AdapterConfig) -> metrics_adapter::Result<()> {
    let client = HttpMetricsClient::from_config(&config)?;
    tracing::info!("Using metrics service at {}", client.endpoint());

    let adapter = Arc::new(MetricsAdapter::new(client).with_unit_lookup(config.unit_lookup));
    api::serve(&config.listen_addr(), adapter).await
}
