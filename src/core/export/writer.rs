//! CSV serialization of a row stream
//!
//! Records are encoded with the `csv` crate into an in-memory chunk that is
//! handed to the async output stream every `flush_rows` rows, so the encoder
//! never blocks on I/O and memory stays bounded by one chunk.

use crate::core::extract::{RowRecord, RowStream};
use crate::domain::{Result, StockpileError};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Write `header` and every row of `rows` to `stream`
///
/// Fields containing a comma, a double quote, `\r` or `\n` are quoted with
/// inner quotes doubled. Lines end in `\n`. The stream is flushed but not
/// shut down; closing it is the caller's job.
///
/// Returns the number of data rows written, excluding the header.
///
/// # Errors
///
/// Returns the first error yielded by `rows`, or
/// [`StockpileError::Write`] naming `destination` if the stream rejects a
/// write.
pub async fn write_csv<W>(
    stream: &mut W,
    destination: &str,
    header: &[String],
    mut rows: RowStream,
    flush_rows: usize,
) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let flush_rows = flush_rows.max(1);
    let mut encoder = chunk_encoder();

    encoder.write_record(header)?;

    let mut row_count: u64 = 0;
    let mut pending: usize = 0;

    while let Some(row) = rows.next().await {
        let row: RowRecord = row?;
        encoder.write_record(row.iter().map(|field| field.as_deref().unwrap_or("")))?;
        row_count += 1;
        pending += 1;

        if pending >= flush_rows {
            drain_into(&mut encoder, stream, destination).await?;
            pending = 0;
        }
    }

    drain_into(&mut encoder, stream, destination).await?;
    stream
        .flush()
        .await
        .map_err(|e| write_error(destination, e))?;

    Ok(row_count)
}

/// Encoder for one chunk of CSV output
fn chunk_encoder() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::with_capacity(64 * 1024))
}

/// Move everything encoded so far into `stream`, leaving a fresh encoder behind
async fn drain_into<W>(
    encoder: &mut csv::Writer<Vec<u8>>,
    stream: &mut W,
    destination: &str,
) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let chunk = std::mem::replace(encoder, chunk_encoder())
        .into_inner()
        .map_err(|e| write_error(destination, e))?;
    if chunk.is_empty() {
        return Ok(());
    }

    stream
        .write_all(&chunk)
        .await
        .map_err(|e| write_error(destination, e))
}

fn write_error(destination: &str, error: impl std::fmt::Display) -> StockpileError {
    StockpileError::Write {
        path: destination.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExportTable;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    fn rows(records: Vec<RowRecord>) -> RowStream {
        stream::iter(records.into_iter().map(Ok)).boxed()
    }

    fn field(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[tokio::test]
    async fn test_header_only_for_empty_stream() {
        let mut out: Vec<u8> = Vec::new();
        let count = write_csv(&mut out, "mem", &header(&["date", "id"]), rows(vec![]), 10)
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "date,id\n");
    }

    #[tokio::test]
    async fn test_none_is_empty_field() {
        let mut out: Vec<u8> = Vec::new();
        let records = vec![vec![field("2026-01-05"), None, field("x")]];
        write_csv(&mut out, "mem", &header(&["date", "a", "b"]), rows(records), 10)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "date,a,b\n2026-01-05,,x\n");
    }

    #[tokio::test]
    async fn test_escaping_round_trips_through_reader() {
        let values = [
            "plain",
            "with,comma",
            "with \"quotes\"",
            "multi\nline",
            "carriage\rreturn",
            "",
        ];
        let records: Vec<RowRecord> = values
            .iter()
            .map(|v| vec![field("2026-01-05"), field(v)])
            .collect();

        let mut out: Vec<u8> = Vec::new();
        let count = write_csv(&mut out, "mem", &header(&["date", "value"]), rows(records), 2)
            .await
            .unwrap();
        assert_eq!(count, values.len() as u64);

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("\"with,comma\""));
        assert!(text.contains("\"with \"\"quotes\"\"\""));

        let mut reader = csv::Reader::from_reader(out.as_slice());
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            vec!["date", "value"]
        );
        let decoded: Vec<String> = reader
            .records()
            .map(|r| r.unwrap().get(1).unwrap().to_string())
            .collect();
        assert_eq!(decoded, values.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stream_is_drained_once() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let source = stream::iter(0..5)
            .map(move |i| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StockpileError>(vec![field("2026-01-05"), Some(i.to_string())])
            })
            .boxed();

        let mut out: Vec<u8> = Vec::new();
        let count = write_csv(&mut out, "mem", &header(&["date", "n"]), source, 3)
            .await
            .unwrap();

        assert_eq!(count, 5);
        assert_eq!(polled.load(Ordering::SeqCst), 5);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 6);
    }

    #[tokio::test]
    async fn test_output_is_independent_of_chunk_size() {
        let records = || -> Vec<RowRecord> {
            (0..50)
                .map(|i| vec![field("2026-01-05"), Some(format!("v{i},\"x\"")), None])
                .collect()
        };
        let columns = header(&["date", "value", "empty"]);

        let mut chunked: Vec<u8> = Vec::new();
        let chunked_count = write_csv(&mut chunked, "mem", &columns, rows(records()), 1)
            .await
            .unwrap();

        let mut single: Vec<u8> = Vec::new();
        let single_count = write_csv(&mut single, "mem", &columns, rows(records()), 1000)
            .await
            .unwrap();

        assert_eq!(chunked_count, 50);
        assert_eq!(single_count, 50);
        assert_eq!(chunked, single);
        assert!(String::from_utf8(chunked)
            .unwrap()
            .starts_with("date,value,empty\n2026-01-05,\"v0,\"\"x\"\"\",\n"));
    }

    #[tokio::test]
    async fn test_row_error_stops_writing() {
        let source = stream::iter(vec![
            Ok(vec![field("2026-01-05"), field("1")]),
            Err(StockpileError::Extraction {
                table: ExportTable::Item,
                message: "cursor closed".to_string(),
            }),
            Ok(vec![field("2026-01-05"), field("3")]),
        ])
        .boxed();

        let mut out: Vec<u8> = Vec::new();
        let err = write_csv(&mut out, "mem", &header(&["date", "n"]), source, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StockpileError::Extraction { .. }));
    }
}
