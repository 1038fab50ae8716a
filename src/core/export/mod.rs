//! Table export
//!
//! - [`orchestrator`] - fail-fast parallel export with rollback
//! - [`writer`] - CSV serialization of a row stream
//! - [`summary`] - run summary for logs and `export --json`

pub mod orchestrator;
pub mod summary;
pub mod writer;

pub use orchestrator::{best_effort_delete, ExportOrchestrator};
pub use summary::ExportSummary;
pub use writer::write_csv;
