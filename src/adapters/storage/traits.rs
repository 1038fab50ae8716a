//! Storage abstraction traits
//!
//! This module defines the contract export backends must implement. The
//! orchestrator and the retention sweep depend only on [`ExportStorage`].

use crate::domain::Result;
use async_trait::async_trait;
use std::fmt;
use tokio::io::AsyncWrite;

/// Writable stream returned by [`ExportStorage::open_output_stream`]
///
/// Closing the stream (`AsyncWriteExt::shutdown`) flushes it; for object
/// storage, shutdown performs the upload.
pub type OutputStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Backend-specific location of an export file
///
/// An absolute filesystem path for local storage, an object key for S3.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// Creates a storage path from its backend-specific string form
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment (the file name)
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Export storage backend
///
/// Implementations must make [`ExportStorage::move_atomic`] a single logical
/// publish step: no reader may ever observe a partially written final file.
#[async_trait]
pub trait ExportStorage: Send + Sync {
    /// Human-readable description for logs (directory or bucket/prefix)
    fn describe(&self) -> String;

    /// Ensure the base location exists. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the base location cannot be created or reached.
    async fn ensure_base_dir(&self) -> Result<()>;

    /// Resolve the final location of an export file name
    fn resolve(&self, file_name: &str) -> StoragePath;

    /// Derive a temporary location for `final_path`, unique per call
    fn resolve_temp(&self, final_path: &StoragePath) -> StoragePath;

    /// Open a write stream at `path`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::StockpileError::Write`] if the stream cannot be opened.
    async fn open_output_stream(&self, path: &StoragePath) -> Result<OutputStream>;

    /// Publish `from` as `to`
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::StockpileError::Publish`] if the move fails.
    async fn move_atomic(&self, from: &StoragePath, to: &StoragePath) -> Result<()>;

    /// Delete `path` if present. Returns whether something was deleted.
    async fn delete_if_exists(&self, path: &StoragePath) -> Result<bool>;

    /// Names (not paths) of the final export files at the base location
    ///
    /// Temporary files are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::StockpileError::Storage`] if the location cannot be enumerated.
    async fn list_base_files(&self) -> Result<Vec<String>>;
}

/// Whether a listed name has the shape of a published export file
///
/// Used by backends to hide temporary files from listings.
pub fn is_final_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.starts_with('.') && name.ends_with(".csv")
}

/// Suffix appended to a final name to build a unique temporary name
pub(crate) fn temp_suffix() -> String {
    format!(".{}.tmp", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_file_name() {
        let path = StoragePath::new("exports/daily/item--2026-01-05.csv");
        assert_eq!(path.file_name(), "item--2026-01-05.csv");
        assert_eq!(StoragePath::new("item.csv").file_name(), "item.csv");
    }

    #[test]
    fn test_is_final_file_name() {
        assert!(is_final_file_name("project--2026-01-05.csv"));
        assert!(is_final_file_name("notes.csv"));
        assert!(!is_final_file_name("project--2026-01-05.csv.0a1b.tmp"));
        assert!(!is_final_file_name("nested/project--2026-01-05.csv"));
        assert!(!is_final_file_name(".hidden.csv"));
        assert!(!is_final_file_name(""));
    }

    #[test]
    fn test_temp_suffix_unique() {
        let a = temp_suffix();
        let b = temp_suffix();
        assert_ne!(a, b);
        assert!(a.starts_with('.'));
        assert!(a.ends_with(".tmp"));
    }
}
