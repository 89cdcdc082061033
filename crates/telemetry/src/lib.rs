//! Telemetry for the ETL stages.
//!
//! Counters live in-process and are logged once per stage run.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
