//! Normalize stage: `s3_load` → `etl_1`.
//!
//! Unprocessed staging rows are typed into fact rows one by one. Rows whose
//! shape is not recognized are skipped but still flagged as processed, so
//! they are never attempted again.

use crate::report::NormalizeReport;
use etl_core::{FactRow, Result};
use telemetry::metrics;
use tracing::{debug, info, warn};
use warehouse::{
    fetch_unprocessed_staging, init_schema, insert::insert_fact_row, mark_staging_processed,
    schema, WarehouseClient,
};

/// Worker that types staging rows into the fact table.
pub struct NormalizeWorker {
    warehouse: WarehouseClient,
}

impl NormalizeWorker {
    pub fn new(warehouse: WarehouseClient) -> Self {
        Self { warehouse }
    }

    /// Runs the stage once.
    ///
    /// A required numeric field that is null or unparsable aborts the run
    /// before the staging flags are flipped.
    pub async fn run(&self) -> Result<NormalizeReport> {
        info!("Normalize starting");

        let schema = init_schema(&self.warehouse, &schema::fact_tables()).await;

        let rows = fetch_unprocessed_staging(&self.warehouse).await?;
        metrics().staging_rows_fetched.inc_by(rows.len() as u64);
        debug!(rows = rows.len(), "Fetched unprocessed staging rows");

        let mut facts_inserted = 0;
        let mut rows_skipped = 0;

        for row in &rows {
            match FactRow::from_staging(row)? {
                Some(fact) => {
                    insert_fact_row(&self.warehouse, &fact).await?;
                    facts_inserted += 1;
                }
                None => {
                    warn!(
                        date = row.date.as_deref().unwrap_or("-"),
                        time = row.time.as_deref().unwrap_or("-"),
                        uri_stem = row.uri_stem.as_deref().unwrap_or("-"),
                        "Staging row has unrecognized shape, skipped"
                    );
                    rows_skipped += 1;
                    metrics().staging_rows_skipped.inc();
                }
            }
        }

        let rows_flagged = mark_staging_processed(&self.warehouse).await?;

        Ok(NormalizeReport {
            schema,
            rows_fetched: rows.len() as u64,
            facts_inserted,
            rows_skipped,
            rows_flagged,
        })
    }
}
