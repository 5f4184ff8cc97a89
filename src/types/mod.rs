//! Core types for the translation relay.
//!
//! This module provides foundational types used throughout the crate:
//! - **IDs**: the correlating `RequestId`
//! - **Errors**: application error types with thiserror derives
//! - **Config**: deployment configuration read from the environment
//! - **Records**: canonical request, translation result, stored pair

mod config;
mod errors;
mod ids;
mod records;

pub use config::{
    Config, GatewayConfig, LanguageDefaults, StorageConfig, StorageEventConfig,
    ENV_CORS_ALLOW_ORIGIN, ENV_DEFAULT_SOURCE_LANGUAGE, ENV_DEFAULT_TARGET_LANGUAGE,
    ENV_FILENAME_DELIMITER, ENV_REQUEST_BUCKET, ENV_RESPONSE_BUCKET,
};
pub use errors::{Error, Result};
pub use ids::RequestId;
pub use records::{BlobLocation, ResponseRecord, StoredPair, TranslationRequest, TranslationResult};
