//! S3 object-created notifications.
//!
//! The notification itself is [`S3Event`] from `aws_lambda_events`. The
//! object body is the text to translate. Language codes come from the body
//! when it is a canonical JSON document, otherwise from the object's file
//! name, `<source><delim><target><delim><name>`.

use serde_json::Value;
use tracing::debug;

use super::direct::CanonicalBody;
use crate::storage::BlobStore;
use crate::types::{BlobLocation, Error, Result, TranslationRequest};

pub use aws_lambda_events::event::s3::{S3Event, S3EventRecord};

/// Event source tag carried by every S3 notification record.
pub const S3_EVENT_SOURCE: &str = "aws:s3";

/// Prefix of every `eventName` that announces a new object.
pub const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

/// Deserialize an S3 notification.
pub fn parse_event(event: Value) -> Result<S3Event> {
    serde_json::from_value(event)
        .map_err(|e| Error::validation(format!("malformed storage event: {e}")))
}

/// Whether the record announces a new or overwritten object.
///
/// Removal, restore and replication notifications carry nothing to translate.
pub fn is_object_created(record: &S3EventRecord) -> bool {
    record
        .event_name
        .as_deref()
        .map(|name| name.starts_with(OBJECT_CREATED_PREFIX))
        .unwrap_or(false)
}

/// Object address with the key URL-decoded (`+` is a space in S3 events).
pub fn record_location(record: &S3EventRecord) -> Result<BlobLocation> {
    let bucket = record
        .s3
        .bucket
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::validation("storage event record has no bucket name"))?;
    let raw = record
        .s3
        .object
        .key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::validation("storage event record has no object key"))?
        .replace('+', " ");
    let key = urlencoding::decode(&raw)
        .map_err(|e| Error::validation(format!("undecodable object key {raw:?}: {e}")))?;
    Ok(BlobLocation::new(bucket, key.into_owned()))
}

/// Languages and remainder parsed from an object file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameLanguages<'a> {
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub name: &'a str,
}

/// Split the last path segment of `key` into `(source, target, name)`.
pub fn parse_file_name<'a>(key: &'a str, delimiter: &str) -> Result<FileNameLanguages<'a>> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let mut parts = file_name.splitn(3, delimiter);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(source), Some(target), Some(name))
            if !source.is_empty() && !target.is_empty() && !name.is_empty() =>
        {
            Ok(FileNameLanguages {
                source_language: source,
                target_language: target,
                name,
            })
        }
        _ => Err(Error::validation(format!("malformed file name: {file_name}"))),
    }
}

/// Fetch the object and build the canonical request.
pub async fn adapt_record(
    store: &dyn BlobStore,
    location: &BlobLocation,
    delimiter: &str,
) -> Result<TranslationRequest> {
    let bytes = store.get(&location.bucket, &location.key).await?;
    let content = String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::validation(format!("{location} is not valid UTF-8 text")))?;
    let content = content.trim_start_matches('\u{feff}');

    if let Some(body) = structured_body(content)? {
        debug!(object = %location, "object carries a structured request");
        let from_name = parse_file_name(&location.key, delimiter).ok();
        let body = CanonicalBody {
            source_language: body
                .source_language
                .or_else(|| from_name.as_ref().map(|n| n.source_language.to_string())),
            target_language: body
                .target_language
                .or_else(|| from_name.as_ref().map(|n| n.target_language.to_string())),
            ..body
        };
        return body.into_request();
    }

    let languages = parse_file_name(&location.key, delimiter)?;
    TranslationRequest::new(
        Some(content),
        Some(languages.source_language),
        Some(languages.target_language),
        None,
    )
}

/// A JSON object with a `text` field is a structured request; anything else
/// is plain text. A structured request with wrongly typed fields is rejected
/// rather than translated verbatim.
fn structured_body(content: &str) -> Result<Option<CanonicalBody>> {
    if !content.trim_start().starts_with('{') {
        return Ok(None);
    }
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    if value.get("text").is_none() {
        return Ok(None);
    }
    CanonicalBody::from_value(value).map(Some)
}


/// A one-record S3 notification, shared by tests across the crate.
#[cfg(test)]
pub(crate) fn event_json(bucket: &str, key: &str, event_name: &str) -> Value {
    serde_json::json!({"Records": [record_json(bucket, key, event_name)]})
}

/// A realistic S3 notification record.
#[cfg(test)]
pub(crate) fn record_json(bucket: &str, key: &str, event_name: &str) -> Value {
    serde_json::json!({
        "eventVersion": "2.1",
        "eventSource": S3_EVENT_SOURCE,
        "awsRegion": "us-east-1",
        "eventTime": "2024-05-17T08:30:00.000Z",
        "eventName": event_name,
        "userIdentity": {"principalId": "AWS:AIDAEXAMPLE"},
        "requestParameters": {"sourceIPAddress": "127.0.0.1"},
        "responseElements": {
            "x-amz-request-id": "C3D13FE58DE4C810",
            "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
        },
        "s3": {
            "s3SchemaVersion": "1.0",
            "configurationId": "translate-relay-uploads",
            "bucket": {
                "name": bucket,
                "ownerIdentity": {"principalId": "A3NL1KOZZKEXAMPLE"},
                "arn": format!("arn:aws:s3:::{bucket}")
            },
            "object": {
                "key": key,
                "size": 1024,
                "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                "sequencer": "0055AED6DCD90281E5"
            }
        }
    })
}
