//! Blob store abstraction (bucket + key object storage).
//!
//! The relay only ever needs two operations: write one object, read one
//! object. [`S3BlobStore`] talks to Amazon S3; [`InMemoryBlobStore`] keeps
//! objects in process memory for tests and local runs.

mod memory;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::types::Result;

pub use memory::{InMemoryBlobStore, StoredObject};
pub use s3::S3BlobStore;

/// Content type of every blob the relay writes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Key/value object storage.
///
/// `get` fails with [`Error::NotFound`](crate::types::Error::NotFound) for a
/// missing object and [`Error::Storage`](crate::types::Error::Storage) for any
/// other failure; `put` fails with `Error::Storage`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes>;
}
