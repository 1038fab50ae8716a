//! Domain models and types for Stockpile.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Table identifiers** ([`ExportTable`]) with their stable file prefixes
//! - **The file naming codec** ([`ExportFileName`]) shared by export and retention
//! - **Per-table outcomes** ([`ExportResult`])
//! - **Error types** ([`StockpileError`]) and the [`Result`] alias
//!
//! # File Names
//!
//! ```rust
//! use stockpile::domain::{ExportFileName, ExportTable};
//! use chrono::NaiveDate;
//!
//! # fn example() -> stockpile::domain::Result<()> {
//! let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
//! let name = ExportFileName::new(ExportTable::Inventory.file_prefix(), date);
//! assert_eq!(name.to_file_name(), "inventory--2026-01-05.csv");
//!
//! let parsed = ExportFileName::parse("inventory--2026-01-05.csv")?;
//! assert_eq!(parsed.date(), date);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod export_result;
pub mod file_name;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use errors::StockpileError;
pub use export_result::ExportResult;
pub use file_name::ExportFileName;
pub use result::Result;
pub use table::ExportTable;
