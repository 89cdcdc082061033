//! Warehouse access for the access-log ETL.

pub mod backfill;
pub mod client;
pub mod config;
pub mod health;
pub mod insert;
pub mod query;
pub mod schema;

pub use backfill::{backfill_foreign_keys, mark_facts_processed, mark_staging_processed};
pub use client::*;
pub use config::*;
pub use health::{check_connection, init_schema};
pub use query::*;
