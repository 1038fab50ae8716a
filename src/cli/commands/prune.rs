//! Prune command implementation
//!
//! This module implements the `prune` command, the retention sweep run by
//! the scheduler after the daily export.

use crate::adapters::storage::create_export_storage;
use crate::cli::commands::{exit_code_for, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::retention::RetentionSweeper;
use chrono::NaiveDate;
use clap::Args;

/// Arguments for the prune command
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Date the retention window is measured from (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub reference_date: Option<NaiveDate>,

    /// Override `retention.months`
    #[arg(long)]
    pub months: Option<u32>,
}

impl PruneArgs {
    /// Execute the prune command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let storage = match create_export_storage(&config.storage).await {
            Ok(storage) => storage,
            Err(e) => {
                eprintln!("Failed to initialize storage: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let reference = self
            .reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let months = self.months.unwrap_or(config.retention.months);
        let sweeper = RetentionSweeper::new(storage, months);

        tracing::info!(reference = %reference, months, "Starting prune command");

        match sweeper.sweep(reference).await {
            Ok(deleted) => {
                println!(
                    "🧹 Deleted {deleted} export file(s) from {months} month(s) before {reference}"
                );
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Retention sweep failed");
                eprintln!("❌ Retention sweep failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
