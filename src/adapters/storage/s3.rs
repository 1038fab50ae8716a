//! S3 object storage backend
//!
//! S3 has no atomic rename. Publishing copies the temp object to its final key
//! and then deletes the temp object. A crash or a failed delete in between
//! leaves an orphan `*.tmp` object that listings never return.

use crate::adapters::storage::traits::{
    is_final_file_name, temp_suffix, ExportStorage, OutputStream, StoragePath,
};
use crate::config::S3StorageConfig;
use crate::domain::{Result, StockpileError};
use crate::log_cleanup_failure;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use futures::future::BoxFuture;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// Export storage in an S3 bucket under a key prefix
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    key_prefix: String,
}

impl S3Storage {
    /// Create a backend from an existing client
    pub fn new(client: S3Client, bucket: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
        }
    }

    /// Create a backend from the `[storage.s3]` section
    ///
    /// Credentials come from the default AWS provider chain.
    pub async fn from_config(config: &S3StorageConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(ref region) = config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            bucket = %config.bucket,
            key_prefix = %config.key_prefix,
            "Creating S3 export storage"
        );

        Ok(Self::new(
            S3Client::from_conf(s3_config),
            &config.bucket,
            &config.key_prefix,
        ))
    }
}

/// `<prefix>/<name>`, or just `<name>` for an empty prefix
fn object_key(key_prefix: &str, file_name: &str) -> String {
    if key_prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{key_prefix}/{file_name}")
    }
}

/// `CopySource` header value: the bucket and the percent-encoded key
fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", bucket, encoded.join("/"))
}

/// Prefix passed to `ListObjectsV2`
fn listing_prefix(key_prefix: &str) -> String {
    if key_prefix.is_empty() {
        String::new()
    } else {
        format!("{key_prefix}/")
    }
}

/// File name of a listed key if it is a final export file directly under the prefix
fn listed_file_name<'a>(listing_prefix: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(listing_prefix)
        .filter(|name| is_final_file_name(name))
}

#[async_trait]
impl ExportStorage for S3Storage {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key_prefix)
    }

    async fn ensure_base_dir(&self) -> Result<()> {
        // Prefixes need no creation; verify the bucket is reachable instead
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StockpileError::Storage(format!(
                    "Bucket '{}' is not accessible: {}",
                    self.bucket,
                    DisplayErrorContext(e)
                ))
            })?;
        Ok(())
    }

    fn resolve(&self, file_name: &str) -> StoragePath {
        StoragePath::new(object_key(&self.key_prefix, file_name))
    }

    fn resolve_temp(&self, final_path: &StoragePath) -> StoragePath {
        StoragePath::new(format!("{}{}", final_path.as_str(), temp_suffix()))
    }

    async fn open_output_stream(&self, path: &StoragePath) -> Result<OutputStream> {
        Ok(Box::new(S3UploadStream::new(put_object_upload(
            self.client.clone(),
            self.bucket.clone(),
            path.as_str().to_string(),
        ))))
    }

    async fn move_atomic(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        let publish_error = |message: String| StockpileError::Publish {
            from: from.to_string(),
            to: to.to_string(),
            message,
        };

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(copy_source(&self.bucket, from.as_str()))
            .key(to.as_str())
            .send()
            .await
            .map_err(|e| publish_error(format!("copy failed: {}", DisplayErrorContext(e))))?;

        // The final object is live once the copy succeeds; a leftover temp
        // object is invisible to listings.
        if let Err(e) = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(from.as_str())
            .send()
            .await
        {
            let error = DisplayErrorContext(e);
            log_cleanup_failure!(from, error, "temp");
        }

        Ok(())
    }

    async fn delete_if_exists(&self, path: &StoragePath) -> Result<bool> {
        let cleanup_error = |message: String| StockpileError::Cleanup {
            path: path.to_string(),
            message,
        };

        // DeleteObject succeeds for missing keys, so check with HeadObject first
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(path.as_str())
            .send()
            .await
        {
            Ok(_) => {}
            Err(e) if e.as_service_error().map(|se| se.is_not_found()) == Some(true) => {
                return Ok(false)
            }
            Err(e) => return Err(cleanup_error(DisplayErrorContext(e).to_string())),
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path.as_str())
            .send()
            .await
            .map_err(|e| cleanup_error(DisplayErrorContext(e).to_string()))?;

        Ok(true)
    }

    async fn list_base_files(&self) -> Result<Vec<String>> {
        let prefix = listing_prefix(&self.key_prefix);
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| {
                    StockpileError::Storage(format!(
                        "Failed to list s3://{}/{}: {}",
                        self.bucket,
                        prefix,
                        DisplayErrorContext(e)
                    ))
                })?;

            names.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .filter_map(|key| listed_file_name(&prefix, key))
                    .map(str::to_string),
            );

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Sends a finished object body
type Upload = Box<dyn FnOnce(Vec<u8>) -> BoxFuture<'static, io::Result<()>> + Send>;

/// `PutObject` upload of `key`
fn put_object_upload(client: S3Client, bucket: String, key: String) -> Upload {
    Box::new(move |body| {
        Box::pin(async move {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type("text/csv; charset=utf-8")
                .body(ByteStream::from(body))
                .send()
                .await
                .map(|_| ())
                .map_err(|e| io::Error::new(io::ErrorKind::Other, DisplayErrorContext(e).to_string()))
        })
    })
}

enum UploadState {
    Buffering { buffer: Vec<u8>, upload: Upload },
    Uploading(BoxFuture<'static, io::Result<()>>),
    Done,
    Failed,
}

/// Buffers an object in memory and uploads it once on shutdown
///
/// Writes are rejected once shutdown has started. A pending upload is resumed
/// by the next `poll_shutdown`, never restarted, and a failed upload stays
/// failed.
struct S3UploadStream {
    state: UploadState,
}

impl S3UploadStream {
    fn new(upload: Upload) -> Self {
        Self {
            state: UploadState::Buffering {
                buffer: Vec::new(),
                upload,
            },
        }
    }
}

impl AsyncWrite for S3UploadStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.get_mut().state {
            UploadState::Buffering { buffer, .. } => {
                buffer.extend_from_slice(buf);
                Poll::Ready(Ok(buf.len()))
            }
            _ => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write after shutdown",
            ))),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            match std::mem::replace(&mut this.state, UploadState::Failed) {
                UploadState::Buffering { buffer, upload } => {
                    this.state = UploadState::Uploading(upload(buffer));
                }
                UploadState::Uploading(mut upload) => {
                    return match upload.as_mut().poll(cx) {
                        Poll::Ready(Ok(())) => {
                            this.state = UploadState::Done;
                            Poll::Ready(Ok(()))
                        }
                        Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
                        Poll::Pending => {
                            this.state = UploadState::Uploading(upload);
                            Poll::Pending
                        }
                    };
                }
                UploadState::Done => {
                    this.state = UploadState::Done;
                    return Poll::Ready(Ok(()));
                }
                UploadState::Failed => {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::Other,
                        "upload already failed",
                    )));
                }
            }
        }
    }
}
