//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Stockpile using clap.
//! An external scheduler (cron, systemd timers) runs `stockpile export` and
//! `stockpile prune` once a day.

pub mod commands;

use clap::{Parser, Subcommand};

/// Stockpile - Daily table snapshot export
#[derive(Parser, Debug)]
#[command(name = "stockpile")]
#[command(version, about, long_about = None)]
#[command(author = "Stockpile Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "stockpile.toml", env = "STOCKPILE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STOCKPILE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every table for a date, all or nothing
    Export(commands::export::ExportArgs),

    /// Delete exports from the month outside the retention window
    Prune(commands::prune::PruneArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExportTable;
    use chrono::NaiveDate;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["stockpile", "export"]);
        assert_eq!(cli.config, "stockpile.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["stockpile", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["stockpile", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_options() {
        let cli = Cli::parse_from([
            "stockpile",
            "export",
            "--date",
            "2026-01-05",
            "--table",
            "item,logistics_item",
            "--json",
        ]);

        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2026, 1, 5));
        assert_eq!(args.table, vec![ExportTable::Item, ExportTable::LogisticsItem]);
        assert!(args.json);
    }

    #[test]
    fn test_cli_rejects_unknown_table() {
        let result = Cli::try_parse_from(["stockpile", "export", "--table", "orders"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_prune() {
        let cli = Cli::parse_from([
            "stockpile",
            "prune",
            "--reference-date",
            "2026-05-15",
            "--months",
            "4",
        ]);

        let Commands::Prune(args) = cli.command else {
            panic!("expected prune command");
        };
        assert_eq!(args.reference_date, NaiveDate::from_ymd_opt(2026, 5, 15));
        assert_eq!(args.months, Some(4));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["stockpile", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["stockpile", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
