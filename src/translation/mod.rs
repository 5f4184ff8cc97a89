//! Translation invoker.
//!
//! The provider is a black box behind [`Translator`]. [`invoke`] makes exactly
//! one call per request: no retry, no cache. The trigger sources carry no
//! idempotency key, so two identical requests are two translations.

mod aws;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::types::{Error, Result, TranslationRequest, TranslationResult};

pub use aws::AwsTranslator;

/// External translation capability.
///
/// Implementations return [`Error::Translation`] when the provider rejects the
/// language pair or text, or cannot be reached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String>;
}

/// Translate a canonical request with a single provider call.
pub async fn invoke(
    translator: &dyn Translator,
    request: TranslationRequest,
) -> Result<TranslationResult> {
    debug!(
        request_id = %request.request_id(),
        source_language = request.source_language(),
        target_language = request.target_language(),
        chars = request.text().chars().count(),
        "invoking translation provider"
    );

    let translated_text = translator
        .translate(
            request.text(),
            request.source_language(),
            request.target_language(),
        )
        .await
        .map_err(|e| {
            warn!(request_id = %request.request_id(), error = %e, "translation failed");
            match e {
                Error::Translation(_) => e,
                other => Error::translation(other.to_string()),
            }
        })?;

    Ok(TranslationResult {
        request,
        translated_text,
    })
}
