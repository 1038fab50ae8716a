//! Local filesystem storage backend
//!
//! Temporary files live next to their final path so that publishing is a
//! same-volume `rename`, which POSIX guarantees to be atomic.

use crate::adapters::storage::traits::{
    is_final_file_name, temp_suffix, ExportStorage, OutputStream, StoragePath,
};
use crate::config::LocalStorageConfig;
use crate::domain::{Result, StockpileError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::BufWriter;

/// Export storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    /// Create a backend rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create a backend from the `[storage.local]` section
    pub fn from_config(config: &LocalStorageConfig) -> Self {
        Self::new(&config.path)
    }

    /// Export root directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    async fn sync_file(path: &Path) -> std::io::Result<()> {
        fs::File::open(path).await?.sync_all().await
    }

    /// Persist the directory entry after a rename. Not supported everywhere,
    /// so failures are only logged.
    #[cfg(unix)]
    async fn sync_dir(dir: &Path) {
        let result = async { fs::File::open(dir).await?.sync_all().await }.await;
        if let Err(e) = result {
            tracing::debug!(dir = %dir.display(), error = %e, "Directory fsync skipped");
        }
    }

    #[cfg(not(unix))]
    async fn sync_dir(_dir: &Path) {}
}

#[async_trait]
impl ExportStorage for LocalStorage {
    fn describe(&self) -> String {
        format!("local:{}", self.base_dir.display())
    }

    async fn ensure_base_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            StockpileError::Storage(format!(
                "Failed to create export directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }

    fn resolve(&self, file_name: &str) -> StoragePath {
        StoragePath::new(self.base_dir.join(file_name).to_string_lossy().into_owned())
    }

    fn resolve_temp(&self, final_path: &StoragePath) -> StoragePath {
        StoragePath::new(format!("{}{}", final_path.as_str(), temp_suffix()))
    }

    async fn open_output_stream(&self, path: &StoragePath) -> Result<OutputStream> {
        let file = fs::File::create(path.as_str())
            .await
            .map_err(|e| StockpileError::Write {
                path: path.to_string(),
                message: format!("Failed to create file: {e}"),
            })?;

        Ok(Box::new(BufWriter::new(file)))
    }

    async fn move_atomic(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        let publish_error = |message: String| StockpileError::Publish {
            from: from.to_string(),
            to: to.to_string(),
            message,
        };

        let from_path = Path::new(from.as_str());
        let to_path = Path::new(to.as_str());

        Self::sync_file(from_path)
            .await
            .map_err(|e| publish_error(format!("fsync failed: {e}")))?;

        fs::rename(from_path, to_path)
            .await
            .map_err(|e| publish_error(format!("rename failed: {e}")))?;

        if let Some(parent) = to_path.parent() {
            Self::sync_dir(parent).await;
        }

        Ok(())
    }

    async fn delete_if_exists(&self, path: &StoragePath) -> Result<bool> {
        match fs::remove_file(path.as_str()).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StockpileError::Cleanup {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn list_base_files(&self) -> Result<Vec<String>> {
        let list_error = |e: std::io::Error| {
            StockpileError::Storage(format!(
                "Failed to list export directory {}: {}",
                self.base_dir.display(),
                e
            ))
        };

        let mut entries = fs::read_dir(&self.base_dir).await.map_err(list_error)?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let file_type = entry.file_type().await.map_err(list_error)?;
            if !file_type.is_file() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                if is_final_file_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
