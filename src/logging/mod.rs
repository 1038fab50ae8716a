//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use stockpile::logging::init_logging;
//! use stockpile::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a single table export
///
/// # Example
///
/// ```no_run
/// use stockpile::log_table_export_start;
/// use stockpile::domain::ExportTable;
///
/// log_table_export_start!(ExportTable::Inventory, "/data/inventory--2026-01-05.csv");
/// ```
#[macro_export]
macro_rules! log_table_export_start {
    ($table:expr, $path:expr) => {
        tracing::info!(
            table = %$table,
            path = %$path,
            "Starting table export"
        );
    };
}

/// Log the completion of a single table export
///
/// # Example
///
/// ```no_run
/// use stockpile::log_table_export_complete;
/// use stockpile::domain::ExportTable;
/// use std::time::Duration;
///
/// log_table_export_complete!(ExportTable::Item, 42u64, Duration::from_millis(870));
/// ```
#[macro_export]
macro_rules! log_table_export_complete {
    ($table:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            table = %$table,
            row_count = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Table export published"
        );
    };
}

/// Log a best-effort cleanup failure that is intentionally not escalated
///
/// # Example
///
/// ```no_run
/// use stockpile::log_cleanup_failure;
/// use stockpile::domain::StockpileError;
///
/// let error = StockpileError::Storage("access denied".to_string());
/// log_cleanup_failure!("exports/item--2026-01-05.csv", &error, "rollback");
/// ```
#[macro_export]
macro_rules! log_cleanup_failure {
    ($path:expr, $error:expr, $phase:expr) => {
        tracing::warn!(
            path = %$path,
            error = %$error,
            phase = $phase,
            "Cleanup failed, continuing"
        );
    };
}
