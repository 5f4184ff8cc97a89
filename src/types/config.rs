//! Configuration structures.
//!
//! Configuration is read once from environment variables at process startup.
//! Missing required keys fail fast with [`Error::Configuration`].

use serde::{Deserialize, Serialize};

use super::errors::{Error, Result};

pub const ENV_REQUEST_BUCKET: &str = "REQUEST_BUCKET";
pub const ENV_RESPONSE_BUCKET: &str = "RESPONSE_BUCKET";
pub const ENV_DEFAULT_SOURCE_LANGUAGE: &str = "DEFAULT_SOURCE_LANGUAGE";
pub const ENV_DEFAULT_TARGET_LANGUAGE: &str = "DEFAULT_TARGET_LANGUAGE";
pub const ENV_CORS_ALLOW_ORIGIN: &str = "CORS_ALLOW_ORIGIN";
pub const ENV_FILENAME_DELIMITER: &str = "FILENAME_DELIMITER";

/// Global relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where request/response pairs are recorded.
    pub storage: StorageConfig,

    /// Language fallbacks for gateway uploads.
    #[serde(default)]
    pub languages: LanguageDefaults,

    /// Gateway response settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage-event key conventions.
    #[serde(default)]
    pub storage_events: StorageEventConfig,
}

/// Recording buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket receiving request blobs.
    pub request_bucket: String,

    /// Bucket receiving response blobs (may equal `request_bucket`).
    pub response_bucket: String,
}

/// Language codes applied to gateway uploads whose caller supplied none.
///
/// Both unset by default: an upload without language codes is rejected
/// rather than silently translated with a guessed pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageDefaults {
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// Gateway response configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Value of `Access-Control-Allow-Origin`; `None` omits the header.
    pub cors_allow_origin: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cors_allow_origin: Some("*".to_string()),
        }
    }
}

/// Object-key convention for storage-event triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEventConfig {
    /// Delimiter of the `<source>-<target>-<name>` file name convention.
    pub filename_delimiter: String,
}

impl Default for StorageEventConfig {
    fn default() -> Self {
        Self {
            filename_delimiter: "-".to_string(),
        }
    }
}

impl Config {
    /// Build a config with the two required buckets and defaults elsewhere.
    pub fn new(request_bucket: impl Into<String>, response_bucket: impl Into<String>) -> Self {
        Self {
            storage: StorageConfig {
                request_bucket: request_bucket.into(),
                response_bucket: response_bucket.into(),
            },
            languages: LanguageDefaults::default(),
            gateway: GatewayConfig::default(),
            storage_events: StorageEventConfig::default(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::configuration(format!("{key} must be set")))
        };
        let optional = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::new(
            required(ENV_REQUEST_BUCKET)?,
            required(ENV_RESPONSE_BUCKET)?,
        );

        config.languages = LanguageDefaults {
            source_language: optional(ENV_DEFAULT_SOURCE_LANGUAGE),
            target_language: optional(ENV_DEFAULT_TARGET_LANGUAGE),
        };

        // Present-but-empty disables the header; absent keeps the default.
        if let Some(origin) = lookup(ENV_CORS_ALLOW_ORIGIN) {
            let origin = origin.trim().to_string();
            config.gateway.cors_allow_origin = (!origin.is_empty()).then_some(origin);
        }

        if let Some(delimiter) = lookup(ENV_FILENAME_DELIMITER) {
            if delimiter.is_empty() {
                return Err(Error::configuration(format!(
                    "{ENV_FILENAME_DELIMITER} cannot be empty"
                )));
            }
            config.storage_events.filename_delimiter = delimiter;
        }

        Ok(config)
    }
}
