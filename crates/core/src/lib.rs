//! Core types, log parsing and row transforms for the access-log ETL.

pub mod dimension;
pub mod error;
pub mod fact;
pub mod log_format;
pub mod outcome;

pub use dimension::*;
pub use error::{DbErrorCode, Error, Result};
pub use fact::*;
pub use log_format::*;
pub use outcome::*;
