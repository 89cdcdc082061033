//! Run counters for the pipeline stages.
//!
//! Collected in-memory for the lifetime of a stage process and logged as a
//! snapshot when the stage finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running statement latency: count, total and slowest.
#[derive(Debug, Default)]
pub struct Latency {
    sum: AtomicU64,
    count: AtomicU64,
    max: AtomicU64,
}

impl Latency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.max.fetch_max(ms, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn max(&self) -> u64 {
        self.max.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }
}

/// Collected metrics for a stage run.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingest
    pub lines_read: Counter,
    pub directives_skipped: Counter,
    pub lines_rejected: Counter,
    pub staging_rows_inserted: Counter,

    // Normalize
    pub staging_rows_fetched: Counter,
    pub fact_rows_inserted: Counter,
    pub staging_rows_skipped: Counter,

    // Dimensionalize
    pub dimension_rows_inserted: Counter,
    pub geo_lookups: Counter,
    pub geo_failures: Counter,

    // Warehouse
    pub statements_executed: Counter,
    pub statement_errors: Counter,
    pub statement_latency_ms: Latency,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub lines_read: u64,
    pub directives_skipped: u64,
    pub lines_rejected: u64,
    pub staging_rows_inserted: u64,
    pub staging_rows_fetched: u64,
    pub fact_rows_inserted: u64,
    pub staging_rows_skipped: u64,
    pub dimension_rows_inserted: u64,
    pub geo_lookups: u64,
    pub geo_failures: u64,
    pub statements_executed: u64,
    pub statement_errors: u64,
    pub statement_latency_mean_ms: f64,
    pub statement_latency_max_ms: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            lines_read: self.lines_read.get(),
            directives_skipped: self.directives_skipped.get(),
            lines_rejected: self.lines_rejected.get(),
            staging_rows_inserted: self.staging_rows_inserted.get(),
            staging_rows_fetched: self.staging_rows_fetched.get(),
            fact_rows_inserted: self.fact_rows_inserted.get(),
            staging_rows_skipped: self.staging_rows_skipped.get(),
            dimension_rows_inserted: self.dimension_rows_inserted.get(),
            geo_lookups: self.geo_lookups.get(),
            geo_failures: self.geo_failures.get(),
            statements_executed: self.statements_executed.get(),
            statement_errors: self.statement_errors.get(),
            statement_latency_mean_ms: self.statement_latency_ms.mean(),
            statement_latency_max_ms: self.statement_latency_ms.max(),
        }
    }
}

/// Log a snapshot at the end of a stage.
pub fn log_snapshot(stage: &str, snapshot: &MetricsSnapshot) {
    info!(
        stage = stage,
        lines_read = snapshot.lines_read,
        lines_rejected = snapshot.lines_rejected,
        staging_rows_inserted = snapshot.staging_rows_inserted,
        fact_rows_inserted = snapshot.fact_rows_inserted,
        staging_rows_skipped = snapshot.staging_rows_skipped,
        dimension_rows_inserted = snapshot.dimension_rows_inserted,
        geo_failures = snapshot.geo_failures,
        statements = snapshot.statements_executed,
        statement_errors = snapshot.statement_errors,
        latency_mean_ms = format!("{:.1}", snapshot.statement_latency_mean_ms),
        latency_max_ms = snapshot.statement_latency_max_ms,
        "Stage metrics"
    );
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
