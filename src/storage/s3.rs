//! Amazon S3 blob store.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::BlobStore;
use crate::types::{Error, Result};

/// S3-backed [`BlobStore`]. The client is built once per process and shared
/// by every invocation.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an already-loaded SDK config.
    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                Error::storage(format!(
                    "put s3://{bucket}/{key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false);
                return Err(if missing {
                    Error::not_found(format!("s3://{bucket}/{key}"))
                } else {
                    Error::storage(format!(
                        "get s3://{bucket}/{key} failed: {}",
                        DisplayErrorContext(&e)
                    ))
                });
            }
        };

        let data = output.body.collect().await.map_err(|e| {
            Error::storage(format!("reading body of s3://{bucket}/{key} failed: {e}"))
        })?;
        Ok(data.into_bytes())
    }
}
