//! Pairing recorder - persists a translated request as two correlated blobs.
//!
//! Key layout:
//! ```text
//!   request bucket:   request/<YYYY-MM-DD>/<request_id>.json
//!   response bucket:  response/<YYYY-MM-DD>/<request_id>.json
//! ```
//! The response key is the request key with its first segment swapped.
//!
//! Writes are sequential: the response blob is attempted only after the
//! request blob is stored. A failed response write leaves the request blob
//! in place; nothing is deleted.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::storage::{BlobStore, JSON_CONTENT_TYPE};
use crate::types::{
    BlobLocation, ResponseRecord, Result, StorageConfig, StoredPair, TranslationRequest,
    TranslationResult,
};

pub const REQUEST_SEGMENT: &str = "request";
pub const RESPONSE_SEGMENT: &str = "response";

/// Request blob key for `request`.
pub fn request_key(request: &TranslationRequest) -> String {
    format!(
        "{REQUEST_SEGMENT}/{}/{}.json",
        request.timestamp().format("%Y-%m-%d"),
        request.request_id()
    )
}

/// Paired response key for a request key, `None` if `key` is not a request key.
pub fn response_key_for(key: &str) -> Option<String> {
    key.strip_prefix(REQUEST_SEGMENT)
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| format!("{RESPONSE_SEGMENT}/{rest}"))
}

/// Writes and reads request/response pairs.
#[derive(Clone)]
pub struct PairingRecorder {
    store: Arc<dyn BlobStore>,
    request_bucket: String,
    response_bucket: String,
}

impl std::fmt::Debug for PairingRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairingRecorder")
            .field("request_bucket", &self.request_bucket)
            .field("response_bucket", &self.response_bucket)
            .finish_non_exhaustive()
    }
}

impl PairingRecorder {
    pub fn new(store: Arc<dyn BlobStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            request_bucket: config.request_bucket.clone(),
            response_bucket: config.response_bucket.clone(),
        }
    }

    /// Where the pair for `request` lives.
    pub fn locate(&self, request: &TranslationRequest) -> StoredPair {
        let request_key = request_key(request);
        let response_key = response_key_for(&request_key).unwrap_or_default();
        StoredPair {
            request_id: request.request_id().clone(),
            request: BlobLocation::new(self.request_bucket.clone(), request_key),
            response: BlobLocation::new(self.response_bucket.clone(), response_key),
        }
    }

    /// Whether `location` is a blob this recorder writes.
    ///
    /// Storage-event triggers use this to ignore their own output when the
    /// upload bucket doubles as a recording bucket.
    pub fn owns(&self, location: &BlobLocation) -> bool {
        let under = |bucket: &str, segment: &str| {
            location.bucket == bucket
                && location
                    .key
                    .strip_prefix(segment)
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false)
        };
        under(&self.request_bucket, REQUEST_SEGMENT) || under(&self.response_bucket, RESPONSE_SEGMENT)
    }

    /// Write the request blob, then the response blob.
    pub async fn record(&self, result: &TranslationResult) -> Result<StoredPair> {
        let pair = self.locate(&result.request);

        let request_body = Bytes::from(serde_json::to_vec(&result.request)?);
        let response_body = Bytes::from(serde_json::to_vec(&result.to_response_record())?);

        if let Err(e) = self
            .store
            .put(&pair.request.bucket, &pair.request.key, request_body, JSON_CONTENT_TYPE)
            .await
        {
            error!(
                request_id = %pair.request_id,
                location = %pair.request,
                error = %e,
                "request blob write failed; response blob not attempted"
            );
            return Err(e);
        }

        if let Err(e) = self
            .store
            .put(&pair.response.bucket, &pair.response.key, response_body, JSON_CONTENT_TYPE)
            .await
        {
            warn!(
                request_id = %pair.request_id,
                location = %pair.response,
                orphan = %pair.request,
                error = %e,
                "response blob write failed; request blob left in place"
            );
            return Err(e);
        }

        info!(
            request_id = %pair.request_id,
            request = %pair.request,
            response = %pair.response,
            "recorded translation pair"
        );
        Ok(pair)
    }

    /// Read both blobs of a pair back.
    pub async fn load(&self, pair: &StoredPair) -> Result<(TranslationRequest, ResponseRecord)> {
        let request = self.store.get(&pair.request.bucket, &pair.request.key).await?;
        let response = self.store.get(&pair.response.bucket, &pair.response.key).await?;
        Ok((
            serde_json::from_slice(&request)?,
            serde_json::from_slice(&response)?,
        ))
    }
}
