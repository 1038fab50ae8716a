//! Row extraction
//!
//! [`Extractor`] is the seam between the orchestrator and the data source.
//! The PostgreSQL implementation lives in [`crate::adapters::postgresql`].

pub mod traits;

pub use traits::{Extractor, RowRecord, RowStream};
