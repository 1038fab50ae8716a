//! Per-table export outcome

use crate::domain::table::ExportTable;
use chrono::NaiveDate;
use serde::Serialize;

/// Result of one successfully published table export
///
/// Exactly one is produced per table per successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportResult {
    /// Exported table
    pub table: ExportTable,

    /// Export (run) date, not the date of the data
    pub date: NaiveDate,

    /// Number of data rows written, excluding the header
    pub row_count: u64,
}

impl ExportResult {
    /// Creates a new export result
    pub fn new(table: ExportTable, date: NaiveDate, row_count: u64) -> Self {
        Self {
            table,
            date,
            row_count,
        }
    }
}
