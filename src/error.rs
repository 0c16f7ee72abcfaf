//! Error types for eminence.
//!
//! All errors are strongly typed using thiserror, one enum per failure
//! domain, aggregated into [`EminenceError`]. Fetch failures are data to
//! the scanner (skip and continue); schema, alias, and checkpoint failures
//! halt the stage that hit them.

use std::path::PathBuf;

use thiserror::Error;

/// Schema errors raised when an input table is missing required structure.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Required column '{column}' is missing from the {table} table")]
    MissingColumn {
        table: String,
        column: String,
    },

    #[error("Row {row} of the {table} table has {actual} fields, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("The {table} table has no rows")]
    Empty {
        table: String,
    },
}

/// Page-access failures reported by a [`PageTextSource`].
///
/// These are caught per entity by the scanner: the entity is skipped and
/// the scan continues.
///
/// [`PageTextSource`]: crate::scan::PageTextSource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Page fetch for '{locator}' timed out after {duration_ms}ms")]
    Timeout {
        locator: String,
        duration_ms: u64,
    },

    #[error("Connection to '{locator}' failed: {message}")]
    Connection {
        locator: String,
        message: String,
    },

    #[error("Source for '{locator}' answered with status {status}")]
    Status {
        locator: String,
        status: u16,
    },

    #[error("No page text is available for '{locator}'")]
    Missing {
        locator: String,
    },
}

/// Errors loading or validating an alias table.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("Failed to read alias table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Alias table is not a valid JSON object of string pairs: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Alias '{alias}' maps to '{canonical}', which is itself an alias for '{onward}'")]
    Chained {
        alias: String,
        canonical: String,
        onward: String,
    },
}

/// Errors from checkpoint persistence and resume.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint {index} is corrupted: {reason}")]
    Corrupted {
        index: usize,
        reason: String,
    },

    #[error("Checkpoint {index} was written for a different roster")]
    RosterMismatch {
        index: usize,
    },

    #[error("State directory '{dir}' is locked by another scanner process")]
    Locked {
        dir: PathBuf,
    },
}

/// Top-level error type for eminence.
///
/// This enum encompasses all fatal errors a pipeline stage can return.
/// Non-fatal conditions (per-entity fetch skips, metric fallbacks,
/// unparseable dates) are represented as data, not errors.
#[derive(Debug, Error)]
pub enum EminenceError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Alias error: {0}")]
    Alias(#[from] AliasError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },
}

impl EminenceError {
    /// Creates a configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if this is a schema error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this is a fetch error.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// Returns true if this is a checkpoint error.
    #[must_use]
    pub const fn is_checkpoint(&self) -> bool {
        matches!(self, Self::Checkpoint(_))
    }

    /// Returns true if this error should halt the pipeline stage that
    /// produced it.
    ///
    /// Fetch errors are the one recoverable category: the scanner skips
    /// the affected entity and keeps going. Everything else propagates.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Fetch(_))
    }
}

/// Result type alias for eminence operations.
pub type Result<T> = std::result::Result<T, EminenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_missing_column() {
        let err = SchemaError::MissingColumn {
            table: "roster".to_string(),
            column: "Name".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Name"));
        assert!(msg.contains("roster"));
    }

    #[test]
    fn test_schema_error_row_width() {
        let err = SchemaError::RowWidth {
            table: "roster".to_string(),
            row: 7,
            expected: 4,
            actual: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains('7'));
        assert!(msg.contains("expected 4"));
    }

    #[test]
    fn test_fetch_error_timeout() {
        let err = FetchError::Timeout {
            locator: "Socrates".to_string(),
            duration_ms: 5000,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Socrates"));
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn test_fetch_error_status() {
        let err = FetchError::Status {
            locator: "Plato".to_string(),
            status: 404,
        };
        let msg = format!("{err}");
        assert!(msg.contains("404"));
    }

    #[test]
    fn test_alias_error_chained() {
        let err = AliasError::Chained {
            alias: "J. S. Mill".to_string(),
            canonical: "Mill".to_string(),
            onward: "John Stuart Mill".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("J. S. Mill"));
        assert!(msg.contains("John Stuart Mill"));
    }

    #[test]
    fn test_checkpoint_error_corrupted() {
        let err = CheckpointError::Corrupted {
            index: 200,
            reason: "bad checksum".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("200"));
        assert!(msg.contains("bad checksum"));
    }

    #[test]
    fn test_eminence_error_from_schema() {
        let schema_err = SchemaError::Empty {
            table: "edges".to_string(),
        };
        let err: EminenceError = schema_err.into();
        assert!(err.is_schema());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_eminence_error_from_fetch_is_not_fatal() {
        let fetch_err = FetchError::Missing {
            locator: "Zeno of Citium".to_string(),
        };
        let err: EminenceError = fetch_err.into();
        assert!(err.is_fetch());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_eminence_error_from_checkpoint() {
        let ckpt_err = CheckpointError::RosterMismatch { index: 100 };
        let err: EminenceError = ckpt_err.into();
        assert!(err.is_checkpoint());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_eminence_error_invalid_config() {
        let err = EminenceError::invalid_config("checkpoint_every must be at least 1");
        assert!(err.is_fatal());
        let msg = format!("{err}");
        assert!(msg.contains("checkpoint_every"));
    }
}
