//! Translate relay Lambda - main entry point.
//!
//! One binary serves all three triggers (direct invocation, S3 notification,
//! API Gateway proxy); the event shape decides the path.

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

use translate_relay::storage::S3BlobStore;
use translate_relay::translation::AwsTranslator;
use translate_relay::{Config, TranslationHandler};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize observability
    translate_relay::observability::init_tracing();

    // Fail the cold start if the buckets are not configured
    let config = Config::from_env()?;

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let handler = TranslationHandler::new(
        config,
        Arc::new(AwsTranslator::from_config(&sdk_config)),
        Arc::new(S3BlobStore::from_config(&sdk_config)),
    );

    tracing::info!(config = ?handler.config(), "translate relay starting");

    let handler = &handler;
    run(service_fn(|event: LambdaEvent<Value>| async move {
        let span = tracing::info_span!("invocation", aws_request_id = %event.context.request_id);
        let response = handler.handle(event.payload).instrument(span).await;
        Ok::<Value, Error>(response)
    }))
    .await
}
