//! Unified error types for the ETL pipeline.
//!
//! Database errors carry a code:
//! - DB_001: Table creation failed
//! - DB_002: Insert failed
//! - DB_003: Select failed
//! - DB_004: Update failed
//! - DB_005: Connection failed

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Database error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorCode {
    /// DB_001: CREATE TABLE failed
    SchemaFailed,
    /// DB_002: INSERT failed
    InsertFailed,
    /// DB_003: SELECT failed
    QueryFailed,
    /// DB_004: UPDATE failed
    UpdateFailed,
    /// DB_005: Could not open a connection
    ConnectFailed,
}

impl DbErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SchemaFailed => "DB_001",
            Self::InsertFailed => "DB_002",
            Self::QueryFailed => "DB_003",
            Self::UpdateFailed => "DB_004",
            Self::ConnectFailed => "DB_005",
        }
    }
}

/// Unified error type for the ETL pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more required configuration values are absent.
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),

    /// Database error with code.
    #[error("[{code}] {message}")]
    Database { code: &'static str, message: String },

    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("geolocation error: {0}")]
    Geolocation(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value {value:?} for field {field}")]
    InvalidField { field: String, value: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a database error.
    pub fn database(code: DbErrorCode, msg: impl Into<String>) -> Self {
        Self::Database {
            code: code.code(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn object_store(msg: impl Into<String>) -> Self {
        Self::ObjectStore(msg.into())
    }

    pub fn geolocation(msg: impl Into<String>) -> Self {
        Self::Geolocation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Database { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the error stops the current stage run.
    ///
    /// Geolocation failures only cost one dimension row; everything else
    /// propagates to the binary.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Geolocation(_))
    }
}
