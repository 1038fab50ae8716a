//! Month-based retention sweep

use crate::adapters::storage::ExportStorage;
use crate::core::export::best_effort_delete;
use crate::domain::{ExportFileName, Result, StockpileError};
use crate::log_cleanup_failure;
use chrono::{Datelike, Months, NaiveDate};
use std::sync::Arc;

/// Deletes export files from one past calendar month
pub struct RetentionSweeper {
    /// Storage backend holding the exports
    storage: Arc<dyn ExportStorage>,

    /// Default window used by [`RetentionSweeper::sweep`]
    months: u32,
}

impl RetentionSweeper {
    /// Create a sweeper with a default window of `months`
    pub fn new(storage: Arc<dyn ExportStorage>, months: u32) -> Self {
        Self { storage, months }
    }

    /// Default retention window in months
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Delete files from the month `retention.months` before `reference`
    ///
    /// # Errors
    ///
    /// See [`RetentionSweeper::delete_older_than`].
    pub async fn sweep(&self, reference: NaiveDate) -> Result<usize> {
        self.delete_older_than(reference, self.months).await
    }

    /// Delete every export file dated in the calendar month exactly
    /// `months_ago` months before `reference`'s month
    ///
    /// Names that do not parse as export files are skipped. A failed delete
    /// is logged and the sweep continues. Returns the number of files
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StockpileError::Configuration`] if `months_ago` is zero or
    /// the target month is out of range, and a storage error if the base
    /// directory cannot be listed.
    pub async fn delete_older_than(&self, reference: NaiveDate, months_ago: u32) -> Result<usize> {
        let (year, month) = target_month(reference, months_ago)?;

        tracing::info!(
            reference = %reference,
            months_ago,
            target = %format!("{year:04}-{month:02}"),
            destination = %self.storage.describe(),
            "Starting retention sweep"
        );

        let names = self.storage.list_base_files().await?;
        let mut deleted = 0;

        for name in names {
            let parsed = match ExportFileName::parse(&name) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!(file = %name, reason = %e, "Skipping unrecognized file");
                    continue;
                }
            };

            let date = parsed.date();
            if date.year() != year || date.month() != month {
                continue;
            }

            let path = self.storage.resolve(&name);
            match best_effort_delete(self.storage.as_ref(), &path).await {
                Ok(true) => {
                    tracing::info!(path = %path, "Deleted expired export");
                    deleted += 1;
                }
                Ok(false) => tracing::debug!(path = %path, "Expired export already gone"),
                Err(e) => {
                    log_cleanup_failure!(path, &e, "retention");
                }
            }
        }

        tracing::info!(deleted, "Retention sweep complete");
        Ok(deleted)
    }
}

/// Year and month `months_ago` months before `reference`'s month
fn target_month(reference: NaiveDate, months_ago: u32) -> Result<(i32, u32)> {
    if months_ago == 0 {
        return Err(StockpileError::Configuration(
            "Retention months must be at least 1".to_string(),
        ));
    }

    reference
        .with_day(1)
        .and_then(|first| first.checked_sub_months(Months::new(months_ago)))
        .map(|target| (target.year(), target.month()))
        .ok_or_else(|| {
            StockpileError::Configuration(format!(
                "Retention window of {months_ago} months before {reference} is out of range"
            ))
        })
}
