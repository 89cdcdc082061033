//! Object-store access for raw access-log files.

pub mod config;
pub mod source;

pub use config::*;
pub use source::*;
