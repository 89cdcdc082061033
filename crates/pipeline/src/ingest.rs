//! Ingest stage: log object → `s3_load`.
//!
//! 1. Create the staging table
//! 2. Download the configured object
//! 3. Parse each line, skipping directives and rejecting unknown layouts
//! 4. Insert one unprocessed staging row per accepted line

use crate::report::IngestReport;
use etl_core::{parse_log, ParsedLine, Result};
use log_source::{LogSource, ObjectLocation};
use std::sync::Arc;
use telemetry::metrics;
use tracing::{info, warn};
use warehouse::{init_schema, insert::insert_staging_record, schema, WarehouseClient};

/// Worker that loads one log object into staging.
pub struct IngestWorker {
    warehouse: WarehouseClient,
    source: Arc<dyn LogSource>,
    location: ObjectLocation,
}

impl IngestWorker {
    pub fn new(
        warehouse: WarehouseClient,
        source: Arc<dyn LogSource>,
        location: ObjectLocation,
    ) -> Self {
        Self {
            warehouse,
            source,
            location,
        }
    }

    /// Runs the stage once. Any insert or download failure aborts the run.
    pub async fn run(&self) -> Result<IngestReport> {
        info!(object = %self.location, "Ingest starting");

        let schema = init_schema(&self.warehouse, &schema::staging_tables()).await;

        let bytes = self.source.fetch(&self.location).await?;
        let contents = String::from_utf8_lossy(&bytes);

        let mut report = IngestReport {
            schema,
            lines_read: 0,
            directives_skipped: 0,
            lines_rejected: 0,
            rows_staged: 0,
        };

        for (index, parsed) in parse_log(&contents).enumerate() {
            report.lines_read += 1;
            metrics().lines_read.inc();

            match parsed {
                ParsedLine::Directive => {
                    report.directives_skipped += 1;
                    metrics().directives_skipped.inc();
                }
                ParsedLine::Rejected { token_count } => {
                    warn!(
                        line = index + 1,
                        tokens = token_count,
                        "Line matches no known layout, dropped"
                    );
                    report.lines_rejected += 1;
                    metrics().lines_rejected.inc();
                }
                ParsedLine::Record(record) => {
                    insert_staging_record(&self.warehouse, &record).await?;
                    report.rows_staged += 1;
                }
            }
        }

        Ok(report)
    }
}
