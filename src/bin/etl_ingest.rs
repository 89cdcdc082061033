//! Ingest stage: download the configured log object and stage its lines.

use std::sync::Arc;

use anyhow::{Context, Result};
use log_source::{LogSource, S3LogSource};
use pipeline::IngestWorker;
use weblog_etl::stage;

#[tokio::main]
async fn main() -> Result<()> {
    let config = stage::bootstrap("etl-ingest")?;

    let source = S3LogSource::new(&config.object_store)
        .await
        .context("Failed to create object-store client")?;
    let warehouse = stage::connect_warehouse(&config).await?;

    let worker = IngestWorker::new(
        warehouse.clone(),
        Arc::new(source) as Arc<dyn LogSource>,
        config.object_store.location(),
    );
    let result = worker.run().await;

    if let Ok(report) = &result {
        report.log();
    }

    stage::finish("etl-ingest", &warehouse).await;
    result.context("Ingest failed")?;
    Ok(())
}
