//! Invocation-scoped records: the canonical request, the translation result,
//! and the persisted pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::Result;
use super::ids::RequestId;
use crate::validation::require_parameters;

// =============================================================================
// Canonical request
// =============================================================================

/// Canonical translation request produced by every trigger adapter.
///
/// Fields are private so that a value can only exist after validation; the
/// serialized form is also the request blob's content, and reading a blob
/// back re-runs the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRequest")]
pub struct TranslationRequest {
    request_id: RequestId,
    timestamp: DateTime<Utc>,
    source_language: String,
    target_language: String,
    text: String,
}

impl TranslationRequest {
    /// Validate and build a request stamped with the current time.
    ///
    /// A missing `request_id` gets a fresh UUID v4.
    pub fn new(
        text: Option<&str>,
        source_language: Option<&str>,
        target_language: Option<&str>,
        request_id: Option<RequestId>,
    ) -> Result<Self> {
        Self::new_at(text, source_language, target_language, request_id, Utc::now())
    }

    /// Same as [`TranslationRequest::new`] with an explicit timestamp.
    pub fn new_at(
        text: Option<&str>,
        source_language: Option<&str>,
        target_language: Option<&str>,
        request_id: Option<RequestId>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let params = require_parameters(text, source_language, target_language)?;
        Ok(Self {
            request_id: request_id.unwrap_or_default(),
            timestamp,
            source_language: params.source_language,
            target_language: params.target_language,
            text: params.text,
        })
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Unvalidated wire form of a request blob.
#[derive(Deserialize)]
struct StoredRequest {
    request_id: RequestId,
    timestamp: DateTime<Utc>,
    source_language: String,
    target_language: String,
    text: String,
}

impl TryFrom<StoredRequest> for TranslationRequest {
    type Error = super::errors::Error;

    fn try_from(stored: StoredRequest) -> Result<Self> {
        Self::new_at(
            Some(stored.text.as_str()),
            Some(stored.source_language.as_str()),
            Some(stored.target_language.as_str()),
            Some(stored.request_id),
            stored.timestamp,
        )
    }
}

// =============================================================================
// Translation result
// =============================================================================

/// A request together with the provider's translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub request: TranslationRequest,
    pub translated_text: String,
}

impl TranslationResult {
    /// Content of the response blob.
    pub fn to_response_record(&self) -> ResponseRecord {
        ResponseRecord {
            request_id: self.request.request_id.clone(),
            timestamp: self.request.timestamp,
            source_language: self.request.source_language.clone(),
            target_language: self.request.target_language.clone(),
            original_text: self.request.text.clone(),
            translated_text: self.translated_text.clone(),
        }
    }
}

/// Serialized form of the response blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub request_id: RequestId,
    pub timestamp: DateTime<Utc>,
    pub source_language: String,
    pub target_language: String,
    pub original_text: String,
    pub translated_text: String,
}

// =============================================================================
// Stored pair
// =============================================================================

/// Bucket + key address of one blob.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Where a request blob and its paired response blob were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPair {
    pub request_id: RequestId,
    pub request: BlobLocation,
    pub response: BlobLocation,
}
