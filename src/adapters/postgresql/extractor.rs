//! PostgreSQL row extractor
//!
//! Reads a table through a server-side cursor inside a read-only
//! transaction, fetching `fetch_size` rows per round trip, so memory use is
//! bounded by one batch regardless of table size.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::tables::{table_query, TableQuery};
use crate::core::extract::{Extractor, RowRecord, RowStream};
use crate::domain::{ExportTable, Result, StockpileError};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tokio_postgres::Row;

const CURSOR_NAME: &str = "stockpile_export_cursor";

/// Extractor for one table backed by a pooled PostgreSQL connection
pub struct PostgresExtractor {
    query: &'static TableQuery,
    client: Arc<PostgreSQLClient>,
}

impl PostgresExtractor {
    /// Create an extractor for `table`
    pub fn new(table: ExportTable, client: Arc<PostgreSQLClient>) -> Self {
        Self {
            query: table_query(table),
            client,
        }
    }
}

/// One extractor per table, sharing the connection pool
pub fn registered_extractors(client: Arc<PostgreSQLClient>) -> Vec<Arc<dyn Extractor>> {
    ExportTable::ALL
        .into_iter()
        .map(|table| {
            Arc::new(PostgresExtractor::new(table, client.clone())) as Arc<dyn Extractor>
        })
        .collect()
}

fn extraction_error(table: ExportTable, message: impl std::fmt::Display) -> StockpileError {
    StockpileError::Extraction {
        table,
        message: message.to_string(),
    }
}

fn to_record(table: ExportTable, export_date: &str, row: &Row) -> Result<RowRecord> {
    let mut record = Vec::with_capacity(row.len() + 1);
    record.push(Some(export_date.to_string()));
    for idx in 0..row.len() {
        let value: Option<String> = row
            .try_get(idx)
            .map_err(|e| extraction_error(table, format!("column {idx}: {e}")))?;
        record.push(value);
    }
    Ok(record)
}

struct CursorState {
    connection: deadpool_postgres::Object,
    fetch_sql: String,
    table: ExportTable,
    export_date: String,
}

/// Fetch the next cursor batch, closing the cursor once it is exhausted
async fn fetch_batch(state: CursorState) -> Result<Option<(Vec<RowRecord>, CursorState)>> {
    let rows = state
        .connection
        .query(state.fetch_sql.as_str(), &[])
        .await
        .map_err(|e| extraction_error(state.table, e))?;

    if rows.is_empty() {
        state
            .connection
            .batch_execute(&format!("CLOSE {CURSOR_NAME}; COMMIT"))
            .await
            .map_err(|e| extraction_error(state.table, e))?;
        return Ok(None);
    }

    let records = rows
        .iter()
        .map(|row| to_record(state.table, &state.export_date, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some((records, state)))
}

#[async_trait]
impl Extractor for PostgresExtractor {
    fn table(&self) -> ExportTable {
        self.query.table
    }

    fn header(&self) -> Vec<String> {
        self.query.header()
    }

    async fn extract_rows(&self, date: NaiveDate) -> Result<RowStream> {
        let table = self.query.table;
        let connection = self
            .client
            .get_connection()
            .await
            .map_err(|e| extraction_error(table, e))?;

        let open_sql = format!(
            "BEGIN READ ONLY ISOLATION LEVEL REPEATABLE READ; \
             SET LOCAL statement_timeout = {}; \
             DECLARE {} NO SCROLL CURSOR FOR {}",
            self.client.statement_timeout_ms(),
            CURSOR_NAME,
            self.query.select_sql()
        );
        connection
            .batch_execute(&open_sql)
            .await
            .map_err(|e| extraction_error(table, e))?;

        tracing::debug!(table = %table, fetch_size = self.client.fetch_size(), "Cursor opened");

        let state = CursorState {
            connection,
            fetch_sql: format!("FETCH FORWARD {} FROM {}", self.client.fetch_size(), CURSOR_NAME),
            table,
            export_date: date.format("%Y-%m-%d").to_string(),
        };

        let batches = stream::try_unfold(state, fetch_batch);

        Ok(batches
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<_, StockpileError>)))
            .try_flatten()
            .boxed())
    }
}
