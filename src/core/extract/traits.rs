//! Extractor contract
//!
//! An extractor produces the rows of one table for one export date.

use crate::domain::{ExportTable, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::BoxStream;

/// One CSV record; `None` is written as an empty field
pub type RowRecord = Vec<Option<String>>;

/// Lazy, single-pass sequence of rows
///
/// Finite and ordered by a stable key. Not restartable: it must be consumed
/// exactly once.
pub type RowStream = BoxStream<'static, Result<RowRecord>>;

/// Per-table row source
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Table this extractor exports
    fn table(&self) -> ExportTable;

    /// Column names; the first is always `date`
    fn header(&self) -> Vec<String>;

    /// Start reading the rows to export for `date`
    ///
    /// The first field of every row is `date` in ISO-8601 form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::StockpileError::Extraction`] if the source
    /// cannot be opened. Errors while streaming are yielded as stream items.
    async fn extract_rows(&self, date: NaiveDate) -> Result<RowStream>;
}
