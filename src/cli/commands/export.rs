//! Export command implementation
//!
//! This module implements the `export` command, which snapshots every
//! registered table for one date.

use crate::cli::commands::{exit_code_for, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::export::{ExportOrchestrator, ExportSummary};
use crate::domain::ExportTable;
use chrono::NaiveDate;
use clap::Args;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export date stamped into file names and rows (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Restrict the run to these tables (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "TABLES")]
    pub table: Vec<ExportTable>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Export date, defaulting to today in local time
    pub fn export_date(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown: CancellationToken,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let mut orchestrator = match ExportOrchestrator::from_config(&config).await {
            Ok(orchestrator) => orchestrator.with_shutdown(shutdown),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if !self.table.is_empty() {
            orchestrator = match orchestrator.with_tables(&self.table) {
                Ok(orchestrator) => orchestrator,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(EXIT_CONFIG_ERROR);
                }
            };
        }

        let date = self.export_date();
        let started = Instant::now();

        if !self.json {
            println!(
                "🚀 Exporting {} tables for {} to {}",
                orchestrator.tables().len(),
                date,
                orchestrator.storage().describe()
            );
        }

        let results = match orchestrator.export_all_fail_fast_parallel(date).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("❌ Export failed: {e}");
                if e.is_cancelled() {
                    eprintln!("   Interrupted. No files from this run were kept.");
                } else {
                    eprintln!("   All files from this run were rolled back.");
                }
                return Ok(EXIT_FAILURE);
            }
        };

        let summary = ExportSummary::from_results(
            date,
            orchestrator.storage().describe(),
            &results,
            started.elapsed(),
        );
        summary.log_summary();

        if self.json {
            println!("{}", summary.to_json()?);
        } else {
            println!();
            println!("📊 Export Summary:");
            for (table, rows) in &summary.tables {
                println!("  {table}: {rows} rows");
            }
            println!("  Total rows: {}", summary.total_rows);
            println!("  Duration: {:.2}s", summary.duration_ms as f64 / 1000.0);
            println!();
            println!("✅ Export completed successfully!");
        }

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_args_defaults() {
        let args = ExportArgs {
            date: None,
            table: Vec::new(),
            json: false,
        };

        assert_eq!(args.export_date(), chrono::Local::now().date_naive());
        assert!(args.table.is_empty());
    }

    #[test]
    fn test_export_args_explicit_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let args = ExportArgs {
            date: Some(date),
            table: vec![ExportTable::Project],
            json: true,
        };

        assert_eq!(args.export_date(), date);
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = ExportArgs {
            date: None,
            table: Vec::new(),
            json: false,
        };

        let code = args
            .execute("/nonexistent/stockpile.toml", CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }
}
