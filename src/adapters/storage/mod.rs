//! Export storage abstraction
//!
//! This module provides a trait-based abstraction over where export files
//! live, with a local filesystem and an S3 implementation.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;

pub use factory::create_export_storage;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{ExportStorage, OutputStream, StoragePath};
