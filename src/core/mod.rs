//! Core business logic for Stockpile.
//!
//! # Modules
//!
//! - [`extract`] - The per-table row source contract
//! - [`export`] - Fail-fast parallel export, CSV writing, and run summaries
//! - [`retention`] - Month-based deletion of old exports
//!
//! # Export Workflow
//!
//! 1. **Prepare**: Ensure the storage base directory exists
//! 2. **Extract**: Every table streams its rows for the export date
//! 3. **Write**: Rows are encoded as CSV into a temporary file
//! 4. **Publish**: The temporary file is moved atomically to its final name
//! 5. **Roll back**: On the first failure, every file published by the run is deleted
//!
//! # Example
//!
//! ```rust,no_run
//! use stockpile::config::load_config;
//! use stockpile::core::export::ExportOrchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("stockpile.toml")?;
//! let orchestrator = ExportOrchestrator::from_config(&config).await?;
//!
//! let date = chrono::Local::now().date_naive();
//! let results = orchestrator.export_all_fail_fast_parallel(date).await?;
//!
//! for (table, result) in &results {
//!     println!("{table}: {} rows", result.row_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod extract;
pub mod retention;
