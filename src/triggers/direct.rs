//! Direct invocation: the canonical JSON body, either at the top level of the
//! event or nested under `body` (as a JSON string or an object).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Error, RequestId, Result, TranslationRequest};

/// Canonical JSON request body shared by direct and gateway invocations.
///
/// Fields stay optional here so that a missing field surfaces as the
/// "missing required parameters" validation error rather than a serde error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "sourceLanguage")]
    pub source_language: Option<String>,
    #[serde(default, alias = "targetLanguage")]
    pub target_language: Option<String>,
    #[serde(default, alias = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl CanonicalBody {
    /// Parse a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::validation("request body must be a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::validation(format!("malformed request body: {e}")))
    }

    /// Parse a JSON document held in a string.
    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::validation(format!("request body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Caller-supplied request id, if any.
    pub fn request_id(&self) -> Result<Option<RequestId>> {
        match self.request_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) => RequestId::from_string(id.to_string())
                .map(Some)
                .map_err(|e| Error::validation(e.to_string())),
        }
    }

    /// Validate into a canonical request.
    pub fn into_request(self) -> Result<TranslationRequest> {
        self.into_request_with_id(None)
    }

    /// Validate, using `fallback_id` when the body carries no request id.
    pub fn into_request_with_id(self, fallback_id: Option<RequestId>) -> Result<TranslationRequest> {
        let request_id = self.request_id()?.or(fallback_id);
        TranslationRequest::new(
            self.text.as_deref(),
            self.source_language.as_deref(),
            self.target_language.as_deref(),
            request_id,
        )
    }
}

/// Event invoking the function directly (SDK `Invoke`, test console, step functions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectInvocation {
    pub body: CanonicalBody,
}

impl DirectInvocation {
    pub fn from_value(mut event: Value) -> Result<Self> {
        let nested = event.as_object_mut().and_then(|map| map.remove("body"));

        let body = match nested {
            None | Some(Value::Null) => CanonicalBody::from_value(event)?,
            Some(Value::String(raw)) => CanonicalBody::from_json_str(&raw)?,
            Some(obj @ Value::Object(_)) => CanonicalBody::from_value(obj)?,
            Some(_) => {
                return Err(Error::validation(
                    "body must be a JSON object or a JSON-encoded string",
                ))
            }
        };

        Ok(Self { body })
    }

    pub fn adapt(self) -> Result<TranslationRequest> {
        self.body.into_request()
    }
}
