//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the translation relay.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input (client fault, maps to 400).
    #[error("validation error: {0}")]
    Validation(String),

    /// The translation provider rejected or could not service the request.
    #[error("translation error: {0}")]
    Translation(String),

    /// Blob read/write failure (access denied, network, throttling).
    #[error("storage error: {0}")]
    Storage(String),

    /// Blob not found on read.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing required deployment configuration (fatal at startup).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status code for gateway-style responses.
    ///
    /// Only validation failures are the caller's fault; everything else is a
    /// dependency or deployment failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Translation(_)
            | Error::Storage(_)
            | Error::NotFound(_)
            | Error::Configuration(_)
            | Error::Internal(_)
            | Error::Serialization(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::Translation(_) => "TRANSLATION",
            Error::Storage(_) => "STORAGE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Configuration(_) => "CONFIGURATION",
            Error::Internal(_) => "INTERNAL",
            Error::Serialization(_) => "SERIALIZATION",
        }
    }

    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
