//! Handler integration tests: raw trigger event → translate → recorded pair → response.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use translate_relay::recorder::response_key_for;
use translate_relay::storage::{BlobStore, InMemoryBlobStore};
use translate_relay::translation::Translator;
use translate_relay::types::{ResponseRecord, TranslationRequest};
use translate_relay::{Config, Error, Result, TranslationHandler};

const REQUESTS: &str = "relay-requests";
const RESPONSES: &str = "relay-responses";

// =============================================================================
// Fakes
// =============================================================================

/// Translator answering from a fixed table and recording every call.
#[derive(Debug, Default)]
struct ScriptedTranslator {
    answers: HashMap<(String, String, String), String>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedTranslator {
    fn with(mut self, text: &str, source: &str, target: &str, answer: &str) -> Self {
        self.answers.insert(
            (text.to_string(), source.to_string(), target.to_string()),
            answer.to_string(),
        );
        self
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let call = (text.to_string(), source.to_string(), target.to_string());
        self.calls.lock().unwrap().push(call.clone());
        self.answers
            .get(&call)
            .cloned()
            .ok_or_else(|| Error::translation(format!("unsupported language pair {source}->{target}")))
    }
}

/// In-memory store that rejects writes to one bucket.
#[derive(Debug)]
struct FailingBucketStore {
    inner: InMemoryBlobStore,
    failing_bucket: String,
}

#[async_trait]
impl BlobStore for FailingBucketStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        if bucket == self.failing_bucket {
            return Err(Error::storage(format!("access denied to {bucket}")));
        }
        self.inner.put(bucket, key, body, content_type).await
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.inner.get(bucket, key).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn relay(
    translator: Arc<ScriptedTranslator>,
    store: Arc<InMemoryBlobStore>,
) -> TranslationHandler {
    TranslationHandler::new(Config::new(REQUESTS, RESPONSES), translator, store)
}

fn hello_translator() -> Arc<ScriptedTranslator> {
    Arc::new(ScriptedTranslator::default().with("Hello", "en", "es", "Hola"))
}

fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

fn s3_record(bucket: &str, key: &str, event_name: &str) -> Value {
    json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
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
            "configurationId": "translate-uploads",
            "bucket": {
                "name": bucket,
                "ownerIdentity": {"principalId": "A3NL1KOZZKExample"},
                "arn": format!("arn:aws:s3:::{bucket}")
            },
            "object": {
                "key": key,
                "size": 5,
                "eTag": "8b1a9953c4611296a827abf8c47804d7",
                "sequencer": "0055AED6DCD90281E5"
            }
        }
    })
}

fn s3_event(bucket: &str, keys: &[&str]) -> Value {
    let records: Vec<Value> = keys
        .iter()
        .map(|key| s3_record(bucket, key, "ObjectCreated:Put"))
        .collect();
    json!({ "Records": records })
}

/// REST API (payload v1) proxy event.
fn rest_event(method: &str, headers: Value, body: Option<&str>) -> Value {
    json!({
        "resource": "/translate",
        "path": "/translate",
        "httpMethod": method,
        "headers": headers,
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
        "body": body,
        "isBase64Encoded": false
    })
}

/// HTTP API (payload v2) proxy event.
fn http_api_event(
    method: &str,
    request_id: &str,
    headers: Value,
    query: Value,
    body: &str,
    base64: bool,
) -> Value {
    json!({
        "version": "2.0",
        "routeKey": "POST /translate",
        "rawPath": "/translate",
        "rawQueryString": "",
        "headers": headers,
        "queryStringParameters": query,
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
            "requestId": request_id,
            "routeKey": "POST /translate",
            "stage": "$default",
            "time": "17/May/2024:08:30:00 +0000",
            "timeEpoch": 1715934600000i64
        },
        "body": body,
        "isBase64Encoded": base64
    })
}

async fn only_pair(store: &InMemoryBlobStore) -> (TranslationRequest, ResponseRecord, String, String) {
    let request_keys = store.keys(REQUESTS).await;
    let response_keys = store.keys(RESPONSES).await;
    assert_eq!(request_keys.len(), 1, "request blobs: {request_keys:?}");
    assert_eq!(response_keys.len(), 1, "response blobs: {response_keys:?}");

    let request = store.get(REQUESTS, &request_keys[0]).await.unwrap();
    let response = store.get(RESPONSES, &response_keys[0]).await.unwrap();
    (
        serde_json::from_slice(&request).unwrap(),
        serde_json::from_slice(&response).unwrap(),
        request_keys[0].clone(),
        response_keys[0].clone(),
    )
}

// =============================================================================
// Direct invocation
// =============================================================================

#[tokio::test]
async fn test_direct_hello_records_pair() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator.clone(), store.clone());

    let response = handler
        .handle(json!({"text": "Hello", "source_language": "en", "target_language": "es"}))
        .await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(
        body_of(&response),
        json!({"original_text": "Hello", "translated_text": "Hola"})
    );
    assert_eq!(translator.calls().len(), 1);

    let (request, record, request_key, response_key) = only_pair(&store).await;
    assert_eq!(response_key_for(&request_key), Some(response_key));
    assert_eq!(request.text(), "Hello");
    assert_eq!(record.request_id, *request.request_id());
    assert_eq!(record.translated_text, "Hola");
    assert_eq!(record.original_text, "Hello");
}

#[tokio::test]
async fn test_direct_empty_text_is_rejected() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator.clone(), store.clone());

    let response = handler
        .handle(json!({"text": "", "source_language": "en", "target_language": "es"}))
        .await;

    assert_eq!(response["statusCode"], 400);
    assert_eq!(body_of(&response)["kind"], "VALIDATION");
    assert!(translator.calls().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_direct_missing_fields_are_all_named() {
    let handler = relay(hello_translator(), Arc::new(InMemoryBlobStore::new()));

    let response = handler.handle(json!({"text": "Hello"})).await;

    assert_eq!(response["statusCode"], 400);
    let error = body_of(&response)["error"].as_str().unwrap().to_string();
    assert!(error.contains("source_language"), "{error}");
    assert!(error.contains("target_language"), "{error}");
}

#[tokio::test]
async fn test_missing_or_blank_fields_have_no_side_effects() {
    let complete = json!({"text": "Hello", "source_language": "en", "target_language": "es"});

    for field in ["text", "source_language", "target_language"] {
        for blank in [None, Some(""), Some("   ")] {
            let mut body = complete.clone();
            match blank {
                Some(blank) => body[field] = json!(blank),
                None => {
                    body.as_object_mut().unwrap().remove(field);
                }
            }
            let raw = body.to_string();
            let gateway = rest_event(
                "POST",
                json!({"Content-Type": "application/json"}),
                Some(raw.as_str()),
            );

            for event in [body, gateway] {
                let translator = hello_translator();
                let store = Arc::new(InMemoryBlobStore::new());
                let handler = relay(translator.clone(), store.clone());

                let response = handler.handle(event).await;

                assert_eq!(response["statusCode"], 400, "{field} = {blank:?}");
                assert!(translator.calls().is_empty(), "{field} = {blank:?}");
                assert!(store.is_empty().await, "{field} = {blank:?}");
            }
        }
    }
}

#[tokio::test]
async fn test_direct_camel_case_body_with_request_id() {
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(hello_translator(), store.clone());

    let response = handler
        .handle(json!({
            "body": {"text": "Hello", "sourceLanguage": "en", "targetLanguage": "es", "requestId": "caller-42"}
        }))
        .await;

    assert_eq!(response["statusCode"], 200);
    let (request, _, request_key, _) = only_pair(&store).await;
    assert_eq!(request.request_id().as_str(), "caller-42");
    assert!(request_key.ends_with("/caller-42.json"), "{request_key}");
}

#[tokio::test]
async fn test_translation_failure_writes_nothing() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator.clone(), store.clone());

    let response = handler
        .handle(json!({"text": "Hello", "source_language": "en", "target_language": "tlh"}))
        .await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(body_of(&response)["kind"], "TRANSLATION");
    assert_eq!(translator.calls().len(), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_response_write_failure_leaves_request_blob() {
    let store = Arc::new(FailingBucketStore {
        inner: InMemoryBlobStore::new(),
        failing_bucket: RESPONSES.to_string(),
    });
    let handler =
        TranslationHandler::new(Config::new(REQUESTS, RESPONSES), hello_translator(), store.clone());

    let response = handler
        .handle(json!({"text": "Hello", "source_language": "en", "target_language": "es"}))
        .await;

    assert_eq!(response["statusCode"], 500);
    assert_eq!(body_of(&response)["kind"], "STORAGE");
    assert_eq!(store.inner.keys(REQUESTS).await.len(), 1);
    assert!(store.inner.keys(RESPONSES).await.is_empty());
}

#[tokio::test]
async fn test_request_write_failure_writes_nothing() {
    let store = Arc::new(FailingBucketStore {
        inner: InMemoryBlobStore::new(),
        failing_bucket: REQUESTS.to_string(),
    });
    let handler =
        TranslationHandler::new(Config::new(REQUESTS, RESPONSES), hello_translator(), store.clone());

    let response = handler
        .handle(json!({"text": "Hello", "source_language": "en", "target_language": "es"}))
        .await;

    assert_eq!(response["statusCode"], 500);
    assert!(store.inner.is_empty().await);
}

// =============================================================================
// Storage events
// =============================================================================

#[tokio::test]
async fn test_storage_event_translates_uploaded_file() {
    let translator = Arc::new(ScriptedTranslator::default().with("Hi", "en", "es", "Hola"));
    let store = Arc::new(InMemoryBlobStore::new());
    store
        .put("uploads", "en-es-greeting.txt", Bytes::from_static(b"Hi"), "text/plain")
        .await
        .unwrap();
    let handler = relay(translator.clone(), store.clone());

    let response = handler.handle(s3_event("uploads", &["en-es-greeting.txt"])).await;

    assert_eq!(response, Value::Null);
    assert_eq!(
        translator.calls(),
        vec![("Hi".to_string(), "en".to_string(), "es".to_string())]
    );
    let (request, record, _, _) = only_pair(&store).await;
    assert_eq!(request.text(), "Hi");
    assert_eq!(record.translated_text, "Hola");
}

#[tokio::test]
async fn test_storage_event_bad_file_name_writes_nothing() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    store
        .put("uploads", "badname.txt", Bytes::from_static(b"Hello"), "text/plain")
        .await
        .unwrap();
    let handler = relay(translator.clone(), store.clone());

    let response = handler.handle(s3_event("uploads", &["badname.txt"])).await;

    assert_eq!(response, Value::Null);
    assert!(translator.calls().is_empty());
    assert!(store.keys(REQUESTS).await.is_empty());
    assert!(store.keys(RESPONSES).await.is_empty());
}

#[tokio::test]
async fn test_storage_event_records_are_independent() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    store
        .put("uploads", "en-es-a.txt", Bytes::from_static(b"Hello"), "text/plain")
        .await
        .unwrap();
    store
        .put("uploads", "badname.txt", Bytes::from_static(b"Hello"), "text/plain")
        .await
        .unwrap();
    let handler = relay(translator, store.clone());

    let event = translate_relay::triggers::storage_event::parse_event(s3_event(
        "uploads",
        &["badname.txt", "en-es-missing.txt", "en-es-a.txt"],
    ))
    .unwrap();
    let report = handler.handle_storage_event(&event).await;

    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(store.keys(REQUESTS).await.len(), 1);
}

#[tokio::test]
async fn test_storage_event_ignores_own_output() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = TranslationHandler::new(
        Config::new("shared", "shared"),
        translator.clone(),
        store.clone(),
    );

    handler
        .handle(json!({"text": "Hello", "source_language": "en", "target_language": "es"}))
        .await;
    let written = store.keys("shared").await;
    assert_eq!(written.len(), 2);

    // S3 would notify about both blobs just written.
    let keys: Vec<&str> = written.iter().map(String::as_str).collect();
    handler.handle(s3_event("shared", &keys)).await;

    assert_eq!(translator.calls().len(), 1);
    assert_eq!(store.keys("shared").await.len(), 2);
}

#[tokio::test]
async fn test_storage_event_only_translates_created_objects() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    store
        .put("uploads", "en-es-a.txt", Bytes::from_static(b"Hello"), "text/plain")
        .await
        .unwrap();
    let handler = relay(translator.clone(), store.clone());

    let event = json!({
        "Records": [
            s3_record("uploads", "en-es-a.txt", "ObjectRemoved:Delete"),
            s3_record("uploads", "en-es-a.txt", "ObjectTagging:Put"),
            s3_record("uploads", "en-es-a.txt", "ObjectCreated:CompleteMultipartUpload"),
        ]
    });
    let event = translate_relay::triggers::storage_event::parse_event(event).unwrap();
    let report = handler.handle_storage_event(&event).await;

    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.completed.len(), 1);
    assert_eq!(translator.calls().len(), 1);
}

#[tokio::test]
async fn test_malformed_storage_event_returns_null() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator.clone(), store.clone());

    let response = handler
        .handle(json!({"Records": [{"eventSource": "aws:s3", "eventName": "ObjectCreated:Put"}]}))
        .await;

    assert_eq!(response, Value::Null);
    assert!(translator.calls().is_empty());
    assert!(store.is_empty().await);
}

// =============================================================================
// API Gateway
// =============================================================================

#[tokio::test]
async fn test_gateway_json_body_reuses_gateway_request_id() {
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(hello_translator(), store.clone());

    let response = handler
        .handle(rest_event(
            "POST",
            json!({"Content-Type": "application/json"}),
            Some(r#"{"text":"Hello","source_language":"en","target_language":"es"}"#),
        ))
        .await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Content-Language"], "es");
    assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");

    let (request, _, _, _) = only_pair(&store).await;
    assert_eq!(
        request.request_id().as_str(),
        "c6af9ac6-7b61-11e6-9a41-93e8deadbeef"
    );
}

#[tokio::test]
async fn test_gateway_base64_upload() {
    let translator = Arc::new(ScriptedTranslator::default().with("Good morning", "en", "ja", "おはよう"));
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator, store.clone());

    let response = handler
        .handle(http_api_event(
            "POST",
            "up-1",
            json!({"content-type": "text/plain"}),
            json!({"source_language": "en", "target_language": "ja"}),
            &STANDARD.encode("Good morning"),
            true,
        ))
        .await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(
        body_of(&response),
        json!({"original_text": "Good morning", "translated_text": "おはよう"})
    );
    let (_, record, _, _) = only_pair(&store).await;
    assert_eq!(record.target_language, "ja");
}

#[tokio::test]
async fn test_gateway_upload_without_languages_is_rejected() {
    let translator = hello_translator();
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(translator.clone(), store.clone());

    let response = handler
        .handle(rest_event("POST", json!({"Content-Type": "text/plain"}), Some("Hello")))
        .await;

    assert_eq!(response["statusCode"], 400);
    assert!(translator.calls().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_gateway_upload_uses_configured_defaults() {
    let mut config = Config::new(REQUESTS, RESPONSES);
    config.languages.source_language = Some("en".to_string());
    config.languages.target_language = Some("es".to_string());
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = TranslationHandler::new(config, hello_translator(), store.clone());

    let response = handler
        .handle(rest_event("POST", json!({"Content-Type": "text/plain"}), Some("Hello")))
        .await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(store.keys(REQUESTS).await.len(), 1);
}

#[tokio::test]
async fn test_gateway_missing_body() {
    let handler = relay(hello_translator(), Arc::new(InMemoryBlobStore::new()));

    let response = handler.handle(rest_event("POST", json!({}), None)).await;

    assert_eq!(response["statusCode"], 400);
    assert!(body_of(&response)["error"]
        .as_str()
        .unwrap()
        .contains("missing request body"));
}

#[tokio::test]
async fn test_gateway_preflight() {
    let translator = hello_translator();
    let mut config = Config::new(REQUESTS, RESPONSES);
    config.gateway.cors_allow_origin = Some("https://app.example".to_string());
    let handler = TranslationHandler::new(config, translator.clone(), Arc::new(InMemoryBlobStore::new()));

    let response = handler.handle(rest_event("OPTIONS", json!({}), None)).await;

    assert_eq!(response["statusCode"], 204);
    assert_eq!(
        response["headers"]["Access-Control-Allow-Origin"],
        "https://app.example"
    );
    assert!(translator.calls().is_empty());
}

// =============================================================================
// Round trip
// =============================================================================

#[tokio::test]
async fn test_recorded_pair_loads_back() {
    let store = Arc::new(InMemoryBlobStore::new());
    let handler = relay(hello_translator(), store.clone());
    let request = TranslationRequest::new(Some("Hello"), Some("en"), Some("es"), None).unwrap();

    let completion = handler.translate_request(request.clone()).await.unwrap();
    let (loaded_request, loaded_response) = handler.recorder().load(&completion.pair).await.unwrap();

    assert_eq!(loaded_request, request);
    assert_eq!(loaded_response.request_id, *request.request_id());
    assert_eq!(loaded_response.timestamp, request.timestamp());
    assert_eq!(loaded_response.source_language, "en");
    assert_eq!(loaded_response.target_language, "es");
    assert_eq!(loaded_response.translated_text, "Hola");
}
