//! Trigger adapter: inbound Lambda events → canonical [`TranslationRequest`].
//!
//! Three event shapes are accepted, each with its own parser:
//!   direct invocation → `{text, source_language, target_language}` (optionally under `body`)
//!   storage event     → `aws_lambda_events` S3 notification; the object is fetched and parsed
//!   gateway event     → `aws_lambda_events` API Gateway proxy request, JSON body or base64 upload
//!
//! Classification looks at discriminant fields only:
//!   `Records[*].eventSource == "aws:s3"`          → StorageEvent
//!   `requestContext` or `httpMethod` present      → GatewayEvent
//!   any other JSON object                         → DirectInvocation

pub mod direct;
pub mod gateway;
pub mod storage_event;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{Error, Result};

pub use direct::{CanonicalBody, DirectInvocation};
pub use gateway::GatewayEvent;
pub use storage_event::{S3Event, S3EventRecord};

/// Which trigger delivered the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Direct,
    StorageEvent,
    Gateway,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Direct => "direct",
            TriggerKind::StorageEvent => "storage_event",
            TriggerKind::Gateway => "gateway",
        }
    }

    /// Whether a caller is waiting for a response envelope.
    pub fn has_response_channel(self) -> bool {
        !matches!(self, TriggerKind::StorageEvent)
    }

    /// Classify a raw event by its discriminant fields only.
    pub fn of(event: &Value) -> Result<Self> {
        match event {
            Value::Object(map) => discriminate(map),
            _ => Err(Error::validation(
                "unsupported event shape: expected a JSON object",
            )),
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified inbound event.
#[derive(Debug, Clone)]
pub enum TriggerEvent {
    Direct(DirectInvocation),
    Storage(S3Event),
    Gateway(GatewayEvent),
}

impl TriggerEvent {
    /// Classify a raw event by its discriminant fields and parse it.
    pub fn classify(event: Value) -> Result<Self> {
        let kind = TriggerKind::of(&event)?;
        Self::parse(kind, event)
    }

    /// Parse an event already classified as `kind`.
    pub fn parse(kind: TriggerKind, event: Value) -> Result<Self> {
        match kind {
            TriggerKind::StorageEvent => storage_event::parse_event(event).map(TriggerEvent::Storage),
            TriggerKind::Gateway => GatewayEvent::from_value(event).map(TriggerEvent::Gateway),
            TriggerKind::Direct => DirectInvocation::from_value(event).map(TriggerEvent::Direct),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerEvent::Direct(_) => TriggerKind::Direct,
            TriggerEvent::Storage(_) => TriggerKind::StorageEvent,
            TriggerEvent::Gateway(_) => TriggerKind::Gateway,
        }
    }
}

fn discriminate(map: &Map<String, Value>) -> Result<TriggerKind> {
    if let Some(records) = map.get("Records") {
        let records = records
            .as_array()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| Error::validation("Records must be a non-empty array"))?;

        let all_s3 = records.iter().all(|record| {
            record.get("eventSource").and_then(Value::as_str) == Some(storage_event::S3_EVENT_SOURCE)
        });
        if !all_s3 {
            return Err(Error::validation(
                "unsupported event source: only aws:s3 records are handled",
            ));
        }
        return Ok(TriggerKind::StorageEvent);
    }

    if map.contains_key("requestContext") || map.contains_key("httpMethod") {
        return Ok(TriggerKind::Gateway);
    }

    Ok(TriggerKind::Direct)
}
