//! Per-run stage reports.

use etl_core::{BatchOutcome, Dimension};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub schema: BatchOutcome,
    pub lines_read: u64,
    pub directives_skipped: u64,
    pub lines_rejected: u64,
    pub rows_staged: u64,
}

impl IngestReport {
    pub fn log(&self) {
        log_outcome("schema", &self.schema);
        info!(
            lines_read = self.lines_read,
            directives_skipped = self.directives_skipped,
            lines_rejected = self.lines_rejected,
            rows_staged = self.rows_staged,
            "Ingest complete"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub schema: BatchOutcome,
    pub rows_fetched: u64,
    pub facts_inserted: u64,
    pub rows_skipped: u64,
    /// Staging rows flipped to processed, skipped rows included.
    pub rows_flagged: u64,
}

impl NormalizeReport {
    pub fn log(&self) {
        log_outcome("schema", &self.schema);
        info!(
            rows_fetched = self.rows_fetched,
            facts_inserted = self.facts_inserted,
            rows_skipped = self.rows_skipped,
            rows_flagged = self.rows_flagged,
            "Normalize complete"
        );
    }
}

/// Result of loading one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionLoad {
    pub dimension: Dimension,
    pub inserted: u64,
    /// Values left without a row this run (failed geolocation).
    pub unresolved: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionReport {
    pub schema: BatchOutcome,
    pub loads: Vec<DimensionLoad>,
    pub backfill: BatchOutcome,
    pub facts_flagged: u64,
}

impl DimensionReport {
    pub fn inserted(&self, dimension: Dimension) -> u64 {
        self.loads
            .iter()
            .find(|l| l.dimension == dimension)
            .map(|l| l.inserted)
            .unwrap_or(0)
    }

    pub fn log(&self) {
        log_outcome("schema", &self.schema);
        for load in &self.loads {
            info!(
                dimension = %load.dimension,
                inserted = load.inserted,
                unresolved = load.unresolved,
                "Dimension loaded"
            );
        }
        log_outcome("backfill", &self.backfill);
        info!(facts_flagged = self.facts_flagged, "Dimensionalize complete");
    }
}

fn log_outcome(batch: &str, outcome: &BatchOutcome) {
    match outcome {
        BatchOutcome::Success { rows_affected } => {
            info!(batch = batch, rows_affected, "Batch succeeded")
        }
        BatchOutcome::NoRowsAffected => info!(batch = batch, "Batch affected no rows"),
        BatchOutcome::PartialFailure {
            rows_affected,
            failures,
        } => {
            for failure in failures {
                warn!(batch = batch, statement = %failure.statement, error = %failure.error, "Statement failed");
            }
            warn!(
                batch = batch,
                rows_affected,
                failed = failures.len(),
                "Batch partially failed"
            );
        }
        BatchOutcome::Failed { failures } => {
            for failure in failures {
                warn!(batch = batch, statement = %failure.statement, error = %failure.error, "Statement failed");
            }
            warn!(batch = batch, failed = failures.len(), "Batch failed");
        }
    }
}
