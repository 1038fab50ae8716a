//! Retention of published exports
//!
//! Deletes export files whose date falls in one calendar month a fixed
//! number of months before a reference date.

pub mod sweeper;

pub use sweeper::RetentionSweeper;
