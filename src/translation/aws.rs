//! Amazon Translate provider.

use async_trait::async_trait;
use aws_sdk_translate::error::DisplayErrorContext;
use aws_sdk_translate::Client;

use super::Translator;
use crate::types::{Error, Result};

/// [`Translator`] backed by Amazon Translate's `TranslateText` API.
#[derive(Debug, Clone)]
pub struct AwsTranslator {
    client: Client,
}

impl AwsTranslator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from an already-loaded SDK config.
    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl Translator for AwsTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        let output = self
            .client
            .translate_text()
            .text(text)
            .source_language_code(source_language)
            .target_language_code(target_language)
            .send()
            .await
            .map_err(|e| {
                Error::translation(format!(
                    "translate_text({source_language} -> {target_language}) failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.translated_text().to_string())
    }
}
