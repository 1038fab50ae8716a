//! Export run summary
//!
//! Built from the orchestrator's result map once every table is published.

use crate::domain::{ExportResult, ExportTable};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Outcome of one successful export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Export date stamped into every file
    pub date: NaiveDate,

    /// Storage location the files were published to
    pub destination: String,

    /// Data rows per table, excluding headers
    pub tables: BTreeMap<ExportTable, u64>,

    /// Sum of all table row counts
    pub total_rows: u64,

    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl ExportSummary {
    /// Summarize a completed run
    pub fn from_results(
        date: NaiveDate,
        destination: impl Into<String>,
        results: &HashMap<ExportTable, ExportResult>,
        duration: Duration,
    ) -> Self {
        let tables: BTreeMap<ExportTable, u64> = results
            .iter()
            .map(|(table, result)| (*table, result.row_count))
            .collect();
        let total_rows = tables.values().sum();

        Self {
            date,
            destination: destination.into(),
            tables,
            total_rows,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Number of files published
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            date = %self.date,
            destination = %self.destination,
            tables = self.table_count(),
            total_rows = self.total_rows,
            duration_ms = self.duration_ms,
            "Export completed"
        );

        for (table, rows) in &self.tables {
            tracing::debug!(table = %table, row_count = rows, "Table summary");
        }
    }

    /// Pretty-printed JSON form for `export --json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn test_summary_totals() {
        let mut results = HashMap::new();
        results.insert(
            ExportTable::Item,
            ExportResult::new(ExportTable::Item, date(), 12),
        );
        results.insert(
            ExportTable::Project,
            ExportResult::new(ExportTable::Project, date(), 0),
        );

        let summary =
            ExportSummary::from_results(date(), "local:/tmp", &results, Duration::from_millis(1500));

        assert_eq!(summary.table_count(), 2);
        assert_eq!(summary.total_rows, 12);
        assert_eq!(summary.duration_ms, 1500);
        assert_eq!(summary.tables[&ExportTable::Project], 0);
    }

    #[test]
    fn test_summary_json_uses_file_prefixes() {
        let mut results = HashMap::new();
        results.insert(
            ExportTable::LogisticsItem,
            ExportResult::new(ExportTable::LogisticsItem, date(), 3),
        );

        let summary =
            ExportSummary::from_results(date(), "s3://bucket/exports", &results, Duration::ZERO);
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(json["date"], "2026-01-05");
        assert_eq!(json["tables"]["logistics_item"], 3);
        assert_eq!(json["total_rows"], 3);
    }
}
