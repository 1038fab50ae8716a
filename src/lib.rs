// Stockpile - Daily table snapshot export
// Copyright (c) 2025 Stockpile Contributors
// Licensed under the MIT License

//! # Stockpile - Daily table snapshot export
//!
//! Stockpile snapshots a fixed set of PostgreSQL tables into dated CSV files
//! on local disk or S3, once per day, for downstream analytics.
//!
//! ## Overview
//!
//! - **Extracting** each table through a read-only server-side cursor
//! - **Writing** RFC 4180 CSV into a temporary file per table
//! - **Publishing** every file atomically, all tables or none
//! - **Pruning** exports older than a retention window
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export orchestration, CSV writing, retention
//! - [`adapters`] - PostgreSQL source and storage backends
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockpile::config::load_config;
//! use stockpile::core::export::{ExportOrchestrator, ExportSummary};
//! use std::time::Instant;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("stockpile.toml")?;
//!     let orchestrator = ExportOrchestrator::from_config(&config).await?;
//!
//!     let date = chrono::Local::now().date_naive();
//!     let started = Instant::now();
//!     let results = orchestrator.export_all_fail_fast_parallel(date).await?;
//!
//!     let summary = ExportSummary::from_results(
//!         date,
//!         orchestrator.storage().describe(),
//!         &results,
//!         started.elapsed(),
//!     );
//!     println!("Exported {} rows", summary.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## File Naming
//!
//! Every export is named `<table>--<YYYY-MM-DD>.csv`:
//!
//! ```rust
//! use stockpile::domain::ExportFileName;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
//! let name = ExportFileName::new("inventory_item", date);
//! assert_eq!(name.to_file_name(), "inventory_item--2026-01-05.csv");
//!
//! let parsed = ExportFileName::parse("inventory_item--2026-01-05.csv").unwrap();
//! assert_eq!(parsed, name);
//! ```
//!
//! ## Error Handling
//!
//! The library uses [`domain::StockpileError`]; a failed run surfaces as
//! [`domain::StockpileError::ExportFailed`] naming the table that failed first.
//!
//! ## Logging
//!
//! Stockpile uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! tracing::info!(table = "inventory", row_count = 42, "Table export published");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
