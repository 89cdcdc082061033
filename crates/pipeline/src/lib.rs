//! Stage workers for the access-log ETL.
//!
//! Each stage is a one-shot run:
//! - Ingest (log object → `s3_load`)
//! - Normalize (`s3_load` → `etl_1`)
//! - Dimensionalize (`etl_1` → six dimensions, key backfill)

pub mod dimensionalize;
pub mod enrichment;
pub mod ingest;
pub mod normalize;
pub mod report;

pub use dimensionalize::DimensionWorker;
pub use enrichment::{GeoConfig, GeoLocator, IpInfoLocator};
pub use ingest::IngestWorker;
pub use normalize::NormalizeWorker;
pub use report::*;
