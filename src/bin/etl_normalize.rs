//! Normalize stage: type unprocessed staging rows into fact rows.

use anyhow::{Context, Result};
use pipeline::NormalizeWorker;
use weblog_etl::stage;

#[tokio::main]
async fn main() -> Result<()> {
    let config = stage::bootstrap("etl-normalize")?;
    let warehouse = stage::connect_warehouse(&config).await?;

    let result = NormalizeWorker::new(warehouse.clone()).run().await;

    if let Ok(report) = &result {
        report.log();
    }

    stage::finish("etl-normalize", &warehouse).await;
    result.context("Normalize failed")?;
    Ok(())
}
