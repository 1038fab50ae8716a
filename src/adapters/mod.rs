//! External system integrations for Stockpile.
//!
//! - [`postgresql`] - Source database: connection pool and table extractors
//! - [`storage`] - Export destinations: local filesystem and S3
//!
//! # Storage Adapter
//!
//! ```rust,no_run
//! use stockpile::adapters::storage::{ExportStorage, LocalStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = LocalStorage::new("/data/exports");
//! storage.ensure_base_dir().await?;
//! for name in storage.list_base_files().await? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod postgresql;
pub mod storage;
