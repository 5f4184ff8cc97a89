//! API Gateway proxy events (REST payload v1 and HTTP API payload v2).
//!
//! The body is either the canonical JSON request or an uploaded text file.
//! Uploads carry no JSON fields, so their language codes are resolved in
//! order: query string, `x-*-language` headers, configured defaults.

use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayV2httpRequest};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::direct::CanonicalBody;
use crate::types::{Error, LanguageDefaults, RequestId, Result, TranslationRequest};

pub const SOURCE_LANGUAGE_PARAM: &str = "source_language";
pub const TARGET_LANGUAGE_PARAM: &str = "target_language";
pub const SOURCE_LANGUAGE_HEADER: &str = "x-source-language";
pub const TARGET_LANGUAGE_HEADER: &str = "x-target-language";

/// Payload format version of HTTP API events.
const HTTP_API_VERSION: &str = "2.0";

/// A proxy request in either payload format.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Rest(Box<ApiGatewayProxyRequest>),
    HttpApi(Box<ApiGatewayV2httpRequest>),
}

/// How the body is interpreted once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Text,
}

impl GatewayEvent {
    /// Pick the payload format (`version: "2.0"` or `requestContext.http`)
    /// and deserialize.
    pub fn from_value(event: Value) -> Result<Self> {
        let http_api = event.get("version").and_then(Value::as_str) == Some(HTTP_API_VERSION)
            || event.pointer("/requestContext/http").is_some();

        let parsed = if http_api {
            serde_json::from_value(event).map(|e| GatewayEvent::HttpApi(Box::new(e)))
        } else {
            serde_json::from_value(event).map(|e| GatewayEvent::Rest(Box::new(e)))
        };
        parsed.map_err(|e| Error::validation(format!("malformed gateway event: {e}")))
    }

    pub fn method(&self) -> &str {
        match self {
            GatewayEvent::Rest(e) => e.http_method.as_str(),
            GatewayEvent::HttpApi(e) => e.request_context.http.method.as_str(),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            GatewayEvent::Rest(e) => e.path.as_deref(),
            GatewayEvent::HttpApi(e) => e.raw_path.as_deref(),
        }
    }

    /// CORS pre-flight: answered without translating.
    pub fn is_preflight(&self) -> bool {
        self.method().eq_ignore_ascii_case("OPTIONS")
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let value = match self {
            GatewayEvent::Rest(e) => e.headers.get(name),
            GatewayEvent::HttpApi(e) => e.headers.get(name),
        };
        value.and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        match self {
            GatewayEvent::Rest(e) => e.query_string_parameters.first(name),
            GatewayEvent::HttpApi(e) => e.query_string_parameters.first(name),
        }
    }

    fn raw_body(&self) -> Option<&str> {
        match self {
            GatewayEvent::Rest(e) => e.body.as_deref(),
            GatewayEvent::HttpApi(e) => e.body.as_deref(),
        }
    }

    pub fn is_base64_encoded(&self) -> bool {
        match self {
            GatewayEvent::Rest(e) => e.is_base64_encoded,
            GatewayEvent::HttpApi(e) => e.is_base64_encoded,
        }
    }

    /// Gateway-assigned request id, reused as the correlating id when valid.
    pub fn gateway_request_id(&self) -> Option<RequestId> {
        let id = match self {
            GatewayEvent::Rest(e) => e.request_context.request_id.as_deref(),
            GatewayEvent::HttpApi(e) => e.request_context.request_id.as_deref(),
        };
        id.and_then(|id| RequestId::from_string(id.to_string()).ok())
    }

    /// JSON content types parse as the canonical body. A missing content
    /// type means JSON, except for base64 payloads, which are file uploads.
    pub fn body_format(&self) -> BodyFormat {
        let media_type = self
            .header("content-type")
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some("application/json") => BodyFormat::Json,
            Some(ct) if ct.ends_with("+json") => BodyFormat::Json,
            None | Some("") if !self.is_base64_encoded() => BodyFormat::Json,
            _ => BodyFormat::Text,
        }
    }

    /// Body as text, base64-decoded when the gateway flagged it.
    pub fn decoded_body(&self) -> Result<String> {
        let body = self
            .raw_body()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| Error::validation("missing request body"))?;

        if !self.is_base64_encoded() {
            return Ok(body.to_string());
        }

        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| Error::validation(format!("invalid base64 body: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::validation("uploaded file is not valid UTF-8 text"))?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    /// Build the canonical request.
    pub fn adapt(&self, defaults: &LanguageDefaults) -> Result<TranslationRequest> {
        let body = self.decoded_body()?;

        match self.body_format() {
            BodyFormat::Json => {
                CanonicalBody::from_json_str(&body)?.into_request_with_id(self.gateway_request_id())
            }
            BodyFormat::Text => {
                let source = self.language(SOURCE_LANGUAGE_PARAM, SOURCE_LANGUAGE_HEADER, || {
                    defaults.source_language.as_deref()
                });
                let target = self.language(TARGET_LANGUAGE_PARAM, TARGET_LANGUAGE_HEADER, || {
                    defaults.target_language.as_deref()
                });
                TranslationRequest::new(Some(body.as_str()), source, target, self.gateway_request_id())
            }
        }
    }

    fn language<'a>(
        &'a self,
        param: &str,
        header: &str,
        default: impl FnOnce() -> Option<&'a str>,
    ) -> Option<&'a str> {
        self.query_param(param)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.header(header).filter(|v| !v.trim().is_empty()))
            .or_else(default)
    }
}

/// A REST API (payload v1) proxy event without body, as API Gateway sends it.
#[cfg(test)]
pub(crate) fn rest_event_json(method: &str) -> Value {
    serde_json::json!({
        "resource": "/translate",
        "path": "/translate",
        "httpMethod": method,
        "headers": {},
        "multiValueHeaders": {},
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "pathParameters": null,
        "stageVariables": null,
        "requestContext": {
            "accountId": "123456789012",
            "resourceId": "abc123",
            "stage": "prod",
            "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
            "requestTime": "17/May/2024:08:30:00 +0000",
            "requestTimeEpoch": 1715934600000i64,
            "identity": {"sourceIp": "127.0.0.1", "userAgent": "curl/8.4.0"},
            "path": "/prod/translate",
            "resourcePath": "/translate",
            "httpMethod": method,
            "apiId": "1234567890",
            "protocol": "HTTP/1.1"
        },
        "body": null,
        "isBase64Encoded": false
    })
}

/// An HTTP API (payload v2) proxy event without body.
#[cfg(test)]
pub(crate) fn http_api_event_json(method: &str) -> Value {
    serde_json::json!({
        "version": HTTP_API_VERSION,
        "routeKey": "POST /translate",
        "rawPath": "/translate",
        "rawQueryString": "",
        "headers": {},
        "requestContext": {
            "accountId": "123456789012",
            "apiId": "api-id",
            "domainName": "id.execute-api.us-east-1.amazonaws.com",
            "domainPrefix": "id",
            "http": {
                "method": method,
                "path": "/translate",
                "protocol": "HTTP/1.1",
                "sourceIp": "127.0.0.1",
                "userAgent": "curl/8.4.0"
            },
            "requestId": "JKJaXmPLvHcESHA=",
            "routeKey": "POST /translate",
            "stage": "$default",
            "time": "17/May/2024:08:30:00 +0000",
            "timeEpoch": 1715934600000i64
        },
        "isBase64Encoded": false
    })
}
