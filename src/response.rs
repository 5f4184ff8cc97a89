//! Gateway-style response envelope.
//!
//! Direct and gateway invocations both answer with
//! `{statusCode, headers, body, isBase64Encoded}` where `body` is JSON text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{Error, TranslationResult};

/// Successful translation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub original_text: String,
    pub translated_text: String,
}

/// Error body. 5xx messages are generic; the detail stays in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    fn with_json(status_code: u16, body: Value, cors_allow_origin: Option<&str>) -> Self {
        let mut headers = base_headers(cors_allow_origin);
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }

    /// `200` with `{original_text, translated_text}`; `Content-Language`
    /// names the target language that was applied.
    pub fn success(result: &TranslationResult, cors_allow_origin: Option<&str>) -> Self {
        let body = serde_json::json!({
            "original_text": result.request.text(),
            "translated_text": result.translated_text,
        });
        let mut response = Self::with_json(200, body, cors_allow_origin);
        response.headers.insert(
            "Content-Language".to_string(),
            result.request.target_language().to_string(),
        );
        response
    }

    /// Status from [`Error::status_code`], body `{error, kind}`.
    pub fn error(err: &Error, cors_allow_origin: Option<&str>) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            public_message(err).to_string()
        };
        let body = serde_json::json!({
            "error": message,
            "kind": err.kind(),
        });
        Self::with_json(err.status_code(), body, cors_allow_origin)
    }

    /// `204` answer to a CORS pre-flight.
    pub fn preflight(cors_allow_origin: Option<&str>) -> Self {
        let mut headers = base_headers(cors_allow_origin);
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            "OPTIONS,POST".to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type,X-Source-Language,X-Target-Language".to_string(),
        );
        Self {
            status_code: 204,
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Parse `body` back into JSON.
    pub fn json_body(&self) -> crate::types::Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "headers": self.headers,
            "body": self.body,
            "isBase64Encoded": self.is_base64_encoded,
        })
    }
}

fn base_headers(cors_allow_origin: Option<&str>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(origin) = cors_allow_origin {
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            origin.to_string(),
        );
    }
    headers
}

fn public_message(err: &Error) -> &'static str {
    match err {
        Error::Translation(_) => "translation failed",
        Error::Storage(_) | Error::NotFound(_) => "failed to record translation",
        _ => "internal error",
    }
}
