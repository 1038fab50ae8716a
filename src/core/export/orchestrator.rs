//! Fail-fast parallel export orchestrator
//!
//! Runs one extract -> write -> publish pipeline per table on a bounded
//! [`JoinSet`]. Every table's file is either fully published or absent, and
//! a run either publishes every file or none of them:
//!
//! 1. The first failing table cancels the shared [`CancellationToken`].
//! 2. The remaining tasks are drained, so every file that made it to its
//!    final path is recorded before rollback looks at the list.
//! 3. Every recorded final path is deleted and the first cause is returned.

use crate::adapters::postgresql::{registered_extractors, PostgreSQLClient};
use crate::adapters::storage::{create_export_storage, ExportStorage, StoragePath};
use crate::config::{ExportConfig, StockpileConfig};
use crate::core::export::writer::write_csv;
use crate::core::extract::Extractor;
use crate::domain::{ExportFileName, ExportResult, ExportTable, Result, StockpileError};
use crate::{log_cleanup_failure, log_table_export_complete, log_table_export_start};
use chrono::NaiveDate;
use futures::{FutureExt, StreamExt};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Final paths the current run published or started to publish
type CreatedFiles = Arc<Mutex<Vec<StoragePath>>>;

/// Exports every registered table for a date, all or nothing
pub struct ExportOrchestrator {
    storage: Arc<dyn ExportStorage>,
    extractors: Vec<Arc<dyn Extractor>>,
    max_concurrent_tables: usize,
    flush_rows: usize,
    shutdown: CancellationToken,
}

impl ExportOrchestrator {
    /// Create an orchestrator over an explicit storage backend and extractor set
    pub fn new(
        storage: Arc<dyn ExportStorage>,
        extractors: Vec<Arc<dyn Extractor>>,
        config: &ExportConfig,
    ) -> Self {
        Self {
            storage,
            extractors,
            max_concurrent_tables: config.max_concurrent_tables.max(1),
            flush_rows: config.flush_rows.max(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel and roll back the run when `shutdown` fires
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Wire the PostgreSQL extractors and the configured storage backend
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool or the storage backend cannot
    /// be built. No database connection is opened here.
    pub async fn from_config(config: &StockpileConfig) -> Result<Self> {
        let client = Arc::new(PostgreSQLClient::new(config.postgresql.clone())?);
        let storage = create_export_storage(&config.storage).await?;

        Ok(Self::new(
            storage,
            registered_extractors(client),
            &config.export,
        ))
    }

    /// Restrict the run to `tables`
    ///
    /// # Errors
    ///
    /// Returns [`StockpileError::Configuration`] if a table has no
    /// registered extractor.
    pub fn with_tables(mut self, tables: &[ExportTable]) -> Result<Self> {
        if let Some(missing) = tables
            .iter()
            .find(|table| !self.extractors.iter().any(|e| e.table() == **table))
        {
            return Err(StockpileError::Configuration(format!(
                "No extractor registered for table '{missing}'"
            )));
        }

        self.extractors.retain(|e| tables.contains(&e.table()));
        Ok(self)
    }

    /// Tables exported by [`Self::export_all_fail_fast_parallel`]
    pub fn tables(&self) -> Vec<ExportTable> {
        self.extractors.iter().map(|e| e.table()).collect()
    }

    /// Storage backend files are published to
    pub fn storage(&self) -> &Arc<dyn ExportStorage> {
        &self.storage
    }

    /// Export every table for `date` concurrently
    ///
    /// Returns one [`ExportResult`] per table once every file is published.
    ///
    /// # Errors
    ///
    /// Returns [`StockpileError::ExportFailed`] naming the first table that
    /// failed, after every file published by this run has been deleted.
    /// Returns a storage error if the base directory cannot be prepared.
    pub async fn export_all_fail_fast_parallel(
        &self,
        date: NaiveDate,
    ) -> Result<HashMap<ExportTable, ExportResult>> {
        self.storage.ensure_base_dir().await?;

        tracing::info!(
            date = %date,
            tables = self.extractors.len(),
            max_concurrent_tables = self.max_concurrent_tables,
            destination = %self.storage.describe(),
            "Starting export run"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_tables));
        let cancel = self.shutdown.child_token();
        let created: CreatedFiles = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();

        for extractor in &self.extractors {
            let job = TableJob {
                extractor: extractor.clone(),
                storage: self.storage.clone(),
                created: created.clone(),
                cancel: cancel.clone(),
                flush_rows: self.flush_rows,
            };
            let semaphore = semaphore.clone();
            let table = extractor.table();

            tasks.spawn(async move {
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit,
                    _ = job.cancel.cancelled() => return (table, Err(StockpileError::Cancelled)),
                };
                let _permit = match permit {
                    Ok(permit) => permit,
                    Err(e) => return (table, Err(StockpileError::TaskFailed(e.to_string()))),
                };

                (table, job.run(date).await)
            });
        }

        let mut results = HashMap::with_capacity(self.extractors.len());
        let mut first_failure: Option<StockpileError> = None;

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok((_, Ok(result))) => {
                    results.insert(result.table, result);
                    continue;
                }
                Ok((table, Err(e))) => StockpileError::for_table(table, e),
                Err(join_error) => StockpileError::TaskFailed(join_error.to_string()),
            };

            if first_failure.is_none() {
                tracing::error!(
                    table = ?failure.table(),
                    error = %failure,
                    "Table export failed, cancelling remaining tables"
                );
                cancel.cancel();
                first_failure = Some(failure);
            } else if failure.is_cancelled() {
                tracing::debug!(table = ?failure.table(), "Table export cancelled");
            } else {
                tracing::warn!(
                    table = ?failure.table(),
                    error = %failure,
                    "Additional table export failure after cancellation"
                );
            }
        }

        if let Some(failure) = first_failure {
            self.rollback(&created).await;
            return Err(failure);
        }

        Ok(results)
    }

    /// Delete every final file published by this run
    async fn rollback(&self, created: &CreatedFiles) {
        let paths = std::mem::take(&mut *created.lock().await);
        tracing::warn!(files = paths.len(), "Rolling back published export files");

        for path in &paths {
            match best_effort_delete(self.storage.as_ref(), path).await {
                Ok(true) => {
                    tracing::info!(file = path.file_name(), path = %path, "Rolled back export file")
                }
                Ok(false) => tracing::debug!(path = %path, "Export file already absent"),
                Err(e) => {
                    log_cleanup_failure!(path, &e, "rollback");
                }
            }
        }
    }
}

/// Delete `path`, reporting whether it existed
///
/// Callers log the error and carry on; cleanup never replaces the error that
/// made it necessary.
pub async fn best_effort_delete(storage: &dyn ExportStorage, path: &StoragePath) -> Result<bool> {
    storage.delete_if_exists(path).await
}

/// Everything one table task needs, owned so the task is `'static`
struct TableJob {
    extractor: Arc<dyn Extractor>,
    storage: Arc<dyn ExportStorage>,
    created: CreatedFiles,
    cancel: CancellationToken,
    flush_rows: usize,
}

impl TableJob {
    async fn run(self, date: NaiveDate) -> Result<ExportResult> {
        if self.cancel.is_cancelled() {
            return Err(StockpileError::Cancelled);
        }

        let table = self.extractor.table();
        let file_name = ExportFileName::new(table.file_prefix(), date).to_file_name();
        let final_path = self.storage.resolve(&file_name);
        let temp_path = self.storage.resolve_temp(&final_path);

        log_table_export_start!(table, final_path);
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.write_and_publish(date, &temp_path, &final_path))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(StockpileError::TaskFailed(panic_message(panic))));

        match outcome {
            Ok(row_count) => {
                log_table_export_complete!(table, row_count, started.elapsed());
                Ok(ExportResult::new(table, date, row_count))
            }
            Err(e) => {
                if let Err(cleanup) = best_effort_delete(self.storage.as_ref(), &temp_path).await {
                    log_cleanup_failure!(temp_path, &cleanup, "temp");
                }
                Err(e)
            }
        }
    }

    /// Stream the table into `temp_path`, then publish it to `final_path`
    async fn write_and_publish(
        &self,
        date: NaiveDate,
        temp_path: &StoragePath,
        final_path: &StoragePath,
    ) -> Result<u64> {
        let cancel = self.cancel.clone();
        let rows = self
            .extractor
            .extract_rows(date)
            .await?
            .map(move |row| {
                if cancel.is_cancelled() {
                    Err(StockpileError::Cancelled)
                } else {
                    row
                }
            })
            .boxed();

        let mut stream = self.storage.open_output_stream(temp_path).await?;
        let row_count = write_csv(
            &mut stream,
            temp_path.as_str(),
            &self.extractor.header(),
            rows,
            self.flush_rows,
        )
        .await?;
        stream
            .shutdown()
            .await
            .map_err(|e| StockpileError::Write {
                path: temp_path.to_string(),
                message: format!("Failed to close stream: {e}"),
            })?;

        if self.cancel.is_cancelled() {
            return Err(StockpileError::Cancelled);
        }

        // Recorded before publishing: a move that fails after the final file
        // appeared must still be rolled back.
        self.created.lock().await.push(final_path.clone());
        self.storage.move_atomic(temp_path, final_path).await?;

        Ok(row_count)
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("task panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("task panicked: {message}")
    } else {
        "task panicked".to_string()
    }
}
