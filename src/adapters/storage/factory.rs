//! Storage backend factory
//!
//! Selects the concrete [`ExportStorage`] implementation from configuration so
//! that callers only ever hold the trait object.

use crate::adapters::storage::local::LocalStorage;
use crate::adapters::storage::s3::S3Storage;
use crate::adapters::storage::traits::ExportStorage;
use crate::config::{StorageConfig, StorageTarget};
use crate::domain::{Result, StockpileError};
use std::sync::Arc;

/// Create the storage backend named by `storage.target`
///
/// # Errors
///
/// Returns a configuration error if the section for the selected target is
/// missing.
pub async fn create_export_storage(config: &StorageConfig) -> Result<Arc<dyn ExportStorage>> {
    match config.target {
        StorageTarget::Local => {
            let local_config = config.local.as_ref().ok_or_else(|| {
                StockpileError::Configuration(
                    "storage.local configuration is required when storage.target = 'local'"
                        .to_string(),
                )
            })?;

            tracing::info!(path = %local_config.path, "Creating local export storage");
            Ok(Arc::new(LocalStorage::from_config(local_config)) as Arc<dyn ExportStorage>)
        }
        StorageTarget::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                StockpileError::Configuration(
                    "storage.s3 configuration is required when storage.target = 's3'".to_string(),
                )
            })?;

            let storage = S3Storage::from_config(s3_config).await?;
            Ok(Arc::new(storage) as Arc<dyn ExportStorage>)
        }
    }
}
