//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stockpile::adapters::storage::{ExportStorage, LocalStorage, OutputStream, StoragePath};
use stockpile::core::extract::{Extractor, RowRecord, RowStream};
use stockpile::domain::{ExportTable, Result, StockpileError};

/// Serves a fixed number of generated rows
pub struct MemoryExtractor {
    pub table: ExportTable,
    pub rows: usize,
}

impl MemoryExtractor {
    pub fn new(table: ExportTable, rows: usize) -> Arc<dyn Extractor> {
        Arc::new(Self { table, rows })
    }
}

#[async_trait]
impl Extractor for MemoryExtractor {
    fn table(&self) -> ExportTable {
        self.table
    }

    fn header(&self) -> Vec<String> {
        vec!["date".to_string(), "id".to_string(), "note".to_string()]
    }

    async fn extract_rows(&self, date: NaiveDate) -> Result<RowStream> {
        let date = date.to_string();
        let records: Vec<Result<RowRecord>> = (0..self.rows)
            .map(|i| {
                let note = if i % 3 == 0 {
                    None
                } else {
                    Some(format!("note, \"{i}\""))
                };
                Ok(vec![Some(date.clone()), Some(i.to_string()), note])
            })
            .collect();
        Ok(stream::iter(records).boxed())
    }
}

/// Fails mid-stream once every path in `wait_for` has been published
pub struct FailingExtractor {
    pub table: ExportTable,
    pub wait_for: Vec<PathBuf>,
}

#[async_trait]
impl Extractor for FailingExtractor {
    fn table(&self) -> ExportTable {
        self.table
    }

    fn header(&self) -> Vec<String> {
        vec!["date".to_string(), "id".to_string()]
    }

    async fn extract_rows(&self, date: NaiveDate) -> Result<RowStream> {
        let table = self.table;
        let wait_for = self.wait_for.clone();
        let date = date.to_string();

        let first = stream::once(async move { Ok(vec![Some(date), Some("1".to_string())]) });
        let failure = stream::once(async move {
            wait_until_present(&wait_for, Duration::from_secs(10)).await;
            Err(StockpileError::Extraction {
                table,
                message: "connection reset by peer".to_string(),
            })
        });

        Ok(first.chain(failure).boxed())
    }
}

async fn wait_until_present(paths: &[PathBuf], timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !paths.iter().all(|p| p.exists()) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Storage operation a [`FaultyStorage`] breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Publishing fails before anything is moved
    PublishBeforeMove,
    /// The file reaches its final path, then publishing reports an error
    PublishAfterMove,
    /// Every delete fails
    Delete,
}

/// Local storage that injects `fault` for files whose name starts with `target`
pub struct FaultyStorage {
    pub inner: LocalStorage,
    pub fault: Fault,
    pub target: String,
}

impl FaultyStorage {
    pub fn new(dir: &Path, fault: Fault, target: impl Into<String>) -> Arc<dyn ExportStorage> {
        Arc::new(Self {
            inner: LocalStorage::new(dir),
            fault,
            target: target.into(),
        })
    }

    fn hits(&self, fault: Fault, path: &StoragePath) -> bool {
        self.fault == fault && path.file_name().starts_with(&self.target)
    }
}

#[async_trait]
impl ExportStorage for FaultyStorage {
    fn describe(&self) -> String {
        format!("faulty:{}", self.inner.describe())
    }

    async fn ensure_base_dir(&self) -> Result<()> {
        self.inner.ensure_base_dir().await
    }

    fn resolve(&self, file_name: &str) -> StoragePath {
        self.inner.resolve(file_name)
    }

    fn resolve_temp(&self, final_path: &StoragePath) -> StoragePath {
        self.inner.resolve_temp(final_path)
    }

    async fn open_output_stream(&self, path: &StoragePath) -> Result<OutputStream> {
        self.inner.open_output_stream(path).await
    }

    async fn move_atomic(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        let publish_error = || StockpileError::Publish {
            from: from.to_string(),
            to: to.to_string(),
            message: "temp delete failed".to_string(),
        };

        if self.hits(Fault::PublishBeforeMove, to) {
            return Err(publish_error());
        }
        self.inner.move_atomic(from, to).await?;
        if self.hits(Fault::PublishAfterMove, to) {
            return Err(publish_error());
        }
        Ok(())
    }

    async fn delete_if_exists(&self, path: &StoragePath) -> Result<bool> {
        if self.hits(Fault::Delete, path) {
            return Err(StockpileError::Cleanup {
                path: path.to_string(),
                message: "access denied".to_string(),
            });
        }
        self.inner.delete_if_exists(path).await
    }

    async fn list_base_files(&self) -> Result<Vec<String>> {
        self.inner.list_base_files().await
    }
}

/// Names of the regular files in `dir`, sorted
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
