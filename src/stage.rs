//! Process startup shared by the stage binaries.

use anyhow::{bail, Context, Result};
use etl_core::Error;
use tracing::{debug, info};
use warehouse::WarehouseClient;

use crate::config::{load_config, PipelineConfig, USAGE};

/// Install TLS, read `.env`, start tracing and load configuration.
///
/// A missing required variable prints the usage block to stderr before the
/// error is returned.
pub fn bootstrap(stage: &str) -> Result<PipelineConfig> {
    // rustls 0.23+ requires explicit crypto provider selection
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    telemetry::init_tracing_from_env();

    info!(stage = stage, "Starting {} v{}", stage, env!("CARGO_PKG_VERSION"));

    match load_config() {
        Ok(config) => Ok(config),
        Err(e @ Error::MissingConfig(_)) => {
            eprintln!("{}\n\n{}", e, USAGE);
            Err(e).context("Failed to load configuration")
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

/// Open the stage's single-connection warehouse pool and check it answers.
pub async fn connect_warehouse(config: &PipelineConfig) -> Result<WarehouseClient> {
    let warehouse = WarehouseClient::connect(config.warehouse.clone())
        .await
        .context("Failed to connect to warehouse")?;

    if !warehouse::check_connection(&warehouse).await {
        warehouse.close().await;
        bail!(
            "Warehouse at {}:{} is not answering queries",
            config.warehouse.host,
            config.warehouse.port
        );
    }
    Ok(warehouse)
}

/// Log the run metrics and release the pool.
pub async fn finish(stage: &str, warehouse: &WarehouseClient) {
    telemetry::log_snapshot(stage, &telemetry::metrics().snapshot());
    warehouse.close().await;
    info!(stage = stage, "Shutdown complete");
}
