//! Domain error types
//!
//! This module defines the error hierarchy for Stockpile. Errors carry owned
//! strings rather than third-party error types so they can cross task
//! boundaries and be logged uniformly.

use crate::domain::table::ExportTable;
use thiserror::Error;

/// Main Stockpile error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum StockpileError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database connection and pool errors
    #[error("Database error: {0}")]
    Database(String),

    /// The data source failed while rows were being read
    #[error("Extraction failed for table '{table}': {message}")]
    Extraction { table: ExportTable, message: String },

    /// The output stream could not be written or closed
    #[error("Write failed for '{path}': {message}")]
    Write { path: String, message: String },

    /// The temp-to-final move failed
    #[error("Publish failed moving '{from}' to '{to}': {message}")]
    Publish {
        from: String,
        to: String,
        message: String,
    },

    /// Best-effort deletion failed. Only ever logged.
    #[error("Cleanup failed for '{path}': {message}")]
    Cleanup { path: String, message: String },

    /// A file name does not follow the `<table>--<date>.csv` convention
    #[error("Invalid export file name '{name}': {reason}")]
    Format { name: String, reason: String },

    /// Storage errors outside the write/publish path (listing, base dir)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A table export failed and the whole batch was rolled back
    #[error("Export of table '{table}' failed: {source}")]
    ExportFailed {
        table: ExportTable,
        #[source]
        source: Box<StockpileError>,
    },

    /// An export task panicked or could not be joined
    #[error("Export task failed: {0}")]
    TaskFailed(String),

    /// The task observed the batch cancellation signal
    #[error("Export cancelled")]
    Cancelled,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl StockpileError {
    /// Wraps a task-level error with the table it belongs to
    pub fn for_table(table: ExportTable, source: StockpileError) -> Self {
        StockpileError::ExportFailed {
            table,
            source: Box::new(source),
        }
    }

    /// Returns the failing table for batch-level export errors
    pub fn table(&self) -> Option<ExportTable> {
        match self {
            StockpileError::ExportFailed { table, .. } => Some(*table),
            StockpileError::Extraction { table, .. } => Some(*table),
            _ => None,
        }
    }

    /// Whether this error is the cooperative cancellation signal
    pub fn is_cancelled(&self) -> bool {
        match self {
            StockpileError::Cancelled => true,
            StockpileError::ExportFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for StockpileError {
    fn from(err: std::io::Error) -> Self {
        StockpileError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for StockpileError {
    fn from(err: toml::de::Error) -> Self {
        StockpileError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for StockpileError {
    fn from(err: csv::Error) -> Self {
        StockpileError::Io(format!("CSV encoding error: {err}"))
    }
}

impl From<tokio_postgres::Error> for StockpileError {
    fn from(err: tokio_postgres::Error) -> Self {
        StockpileError::Database(err.to_string())
    }
}
