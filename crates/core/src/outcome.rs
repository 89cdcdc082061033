//! Aggregated results of statement batches.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A statement in a batch that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    /// Short label, e.g. the table or key the statement targets.
    pub statement: String,
    pub error: String,
}

/// Result of running a group of independent statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Success { rows_affected: u64 },
    NoRowsAffected,
    PartialFailure {
        rows_affected: u64,
        failures: Vec<StatementFailure>,
    },
    Failed { failures: Vec<StatementFailure> },
}

impl BatchOutcome {
    /// Fold per-statement results into one outcome.
    pub fn collect<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = (S, Result<u64, Error>)>,
        S: Into<String>,
    {
        let mut rows_affected = 0;
        let mut succeeded = 0usize;
        let mut failures = Vec::new();

        for (statement, result) in results {
            match result {
                Ok(rows) => {
                    succeeded += 1;
                    rows_affected += rows;
                }
                Err(e) => failures.push(StatementFailure {
                    statement: statement.into(),
                    error: e.to_string(),
                }),
            }
        }

        match (succeeded, failures.is_empty()) {
            (_, true) if rows_affected == 0 => Self::NoRowsAffected,
            (_, true) => Self::Success { rows_affected },
            (0, false) => Self::Failed { failures },
            (_, false) => Self::PartialFailure {
                rows_affected,
                failures,
            },
        }
    }

    /// Fold DDL results, where affecting no rows is the normal case.
    pub fn from_ddl<I, S>(results: I) -> Self
    where
        I: IntoIterator<Item = (S, Result<u64, Error>)>,
        S: Into<String>,
    {
        match Self::collect(results) {
            Self::NoRowsAffected => Self::Success { rows_affected: 0 },
            other => other,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::NoRowsAffected)
    }

    pub fn rows_affected(&self) -> u64 {
        match self {
            Self::Success { rows_affected } | Self::PartialFailure { rows_affected, .. } => {
                *rows_affected
            }
            Self::NoRowsAffected | Self::Failed { .. } => 0,
        }
    }

    pub fn failures(&self) -> &[StatementFailure] {
        match self {
            Self::PartialFailure { failures, .. } | Self::Failed { failures } => failures,
            _ => &[],
        }
    }
}
