//! In-memory blob store.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::BlobStore;
use crate::types::{BlobLocation, Error, Result};

/// One object held by [`InMemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// Process-local [`BlobStore`]. Keys are ordered so listings are stable.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<BTreeMap<BlobLocation, StoredObject>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an object with its content type.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&BlobLocation::new(bucket, key))
            .cloned()
    }

    /// Keys stored in `bucket`, in lexical order.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|loc| loc.bucket == bucket)
            .map(|loc| loc.key.clone())
            .collect()
    }

    /// Total number of stored objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        if bucket.is_empty() || key.is_empty() {
            return Err(Error::storage("bucket and key must be non-empty"));
        }
        self.objects.write().await.insert(
            BlobLocation::new(bucket, key),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.objects
            .read()
            .await
            .get(&BlobLocation::new(bucket, key))
            .map(|obj| obj.body.clone())
            .ok_or_else(|| Error::not_found(format!("s3://{bucket}/{key}")))
    }
}
