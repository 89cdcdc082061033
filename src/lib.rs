//! Web access-log ETL.
//!
//! Three one-shot stages move a web-server access log from object storage
//! into a star schema:
//! - `etl-ingest`: log object → `s3_load`
//! - `etl-normalize`: `s3_load` → `etl_1`
//! - `etl-dimensionalize`: `etl_1` → `dim_*`, foreign-key backfill

pub mod config;
pub mod stage;

pub use config::{load_config, PipelineConfig, REQUIRED_VARS, USAGE};
