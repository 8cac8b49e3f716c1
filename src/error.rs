//! Error types for the table and the benchmark harness.
//!
//! | Error                        | Recovery                                    |
//! |------------------------------|---------------------------------------------|
//! | TableError::AllocationFailed | Fatal for `insert`; `try_insert` reports it |
//! | TableError::InvalidLoadFactor| Reject the configuration before building    |
//! | RecordError                  | Skip the CSV line, log a warning            |
//! | ReportError                  | Surface to the CLI, exit non-zero           |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the table itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// Growing the bucket array could not allocate. The table is unchanged.
    #[error("failed to allocate a bucket array of {capacity} buckets")]
    AllocationFailed { capacity: usize },

    /// Load factor thresholds must be finite and strictly positive.
    #[error("load factor must be finite and greater than zero, got {0}")]
    InvalidLoadFactor(f64),
}

/// A CSV line that could not be turned into a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    MissingField { expected: usize, found: usize },

    #[error("field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Failures while writing the analysis report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to open report {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write report {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}
