//! Dimensionalize stage: build the dimensions and link facts to them.

use std::sync::Arc;

use anyhow::{Context, Result};
use pipeline::{DimensionWorker, GeoLocator, IpInfoLocator};
use weblog_etl::stage;

#[tokio::main]
async fn main() -> Result<()> {
    let config = stage::bootstrap("etl-dimensionalize")?;

    let locator = IpInfoLocator::new(&config.geo).context("Failed to create geolocation client")?;
    let warehouse = stage::connect_warehouse(&config).await?;

    let worker = DimensionWorker::new(warehouse.clone(), Arc::new(locator) as Arc<dyn GeoLocator>);
    let result = worker.run().await;

    if let Ok(report) = &result {
        report.log();
    }

    stage::finish("etl-dimensionalize", &warehouse).await;
    result.context("Dimensionalize failed")?;
    Ok(())
}
