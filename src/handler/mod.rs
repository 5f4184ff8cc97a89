//! Invocation orchestrator - the top-level Lambda handler.
//!
//! Per invocation: adapt → invoke → record → respond. Nothing is shared
//! between invocations except the injected clients, which are read-only.
//!
//! Failure handling by trigger:
//!   gateway / direct → error envelope (400 for bad input, 500 otherwise)
//!   storage event    → logged and dropped, per record

pub mod state;

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::recorder::PairingRecorder;
use crate::response::GatewayResponse;
use crate::storage::BlobStore;
use crate::translation::{self, Translator};
use crate::triggers::storage_event::{self, S3Event, S3EventRecord};
use crate::triggers::{DirectInvocation, GatewayEvent, TriggerEvent, TriggerKind};
use crate::types::{Config, Result, StoredPair, TranslationRequest, TranslationResult};

pub use state::{Invocation, InvocationState};

/// A translated and recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub result: TranslationResult,
    pub pair: StoredPair,
}

/// What happened to the records of one storage event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageEventReport {
    pub completed: Vec<StoredPair>,
    pub failed: usize,
    pub skipped: usize,
}

/// Orchestrates one invocation with injected collaborators.
pub struct TranslationHandler {
    config: Config,
    translator: Arc<dyn Translator>,
    store: Arc<dyn BlobStore>,
    recorder: PairingRecorder,
}

impl std::fmt::Debug for TranslationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationHandler")
            .field("config", &self.config)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

impl TranslationHandler {
    pub fn new(config: Config, translator: Arc<dyn Translator>, store: Arc<dyn BlobStore>) -> Self {
        let recorder = PairingRecorder::new(store.clone(), &config.storage);
        Self {
            config,
            translator,
            store,
            recorder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recorder(&self) -> &PairingRecorder {
        &self.recorder
    }

    fn cors(&self) -> Option<&str> {
        self.config.gateway.cors_allow_origin.as_deref()
    }

    /// Lambda entry point: classify the raw event and dispatch it.
    ///
    /// Returns the response envelope for gateway and direct invocations and
    /// `null` for storage events, which have no caller to answer.
    #[instrument(skip_all)]
    pub async fn handle(&self, event: Value) -> Value {
        let kind = match TriggerKind::of(&event) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "unclassifiable event");
                return GatewayResponse::error(&err, self.cors()).to_value();
            }
        };

        match TriggerEvent::parse(kind, event) {
            Ok(TriggerEvent::Storage(event)) => {
                self.handle_storage_event(&event).await;
                Value::Null
            }
            Ok(TriggerEvent::Gateway(event)) => self.handle_gateway(&event).await.to_value(),
            Ok(TriggerEvent::Direct(invocation)) => self.handle_direct(invocation).await.to_value(),
            Err(err) if !kind.has_response_channel() => {
                error!(trigger = %kind, kind = err.kind(), error = %err, "event dropped");
                Value::Null
            }
            Err(err) => {
                warn!(trigger = %kind, kind = err.kind(), error = %err, "malformed event");
                GatewayResponse::error(&err, self.cors()).to_value()
            }
        }
    }

    /// Direct invocation: canonical JSON in, envelope out.
    pub async fn handle_direct(&self, event: DirectInvocation) -> GatewayResponse {
        let mut invocation = Invocation::new(TriggerKind::Direct);
        let outcome = match event.adapt() {
            Ok(request) => self.complete(&mut invocation, request).await,
            Err(err) => Err(err),
        };
        self.respond(&mut invocation, outcome)
    }

    /// API Gateway proxy request.
    #[instrument(skip_all, fields(method = event.method(), path = event.path().unwrap_or("")))]
    pub async fn handle_gateway(&self, event: &GatewayEvent) -> GatewayResponse {
        if event.is_preflight() {
            return GatewayResponse::preflight(self.cors());
        }

        let mut invocation = Invocation::new(TriggerKind::Gateway);
        let outcome = match event.adapt(&self.config.languages) {
            Ok(request) => self.complete(&mut invocation, request).await,
            Err(err) => Err(err),
        };
        self.respond(&mut invocation, outcome)
    }

    /// S3 notification: every record is processed independently.
    pub async fn handle_storage_event(&self, event: &S3Event) -> StorageEventReport {
        let mut report = StorageEventReport::default();

        for record in &event.records {
            match self.handle_storage_record(record).await {
                RecordOutcome::Completed(pair) => report.completed.push(pair),
                RecordOutcome::Skipped => report.skipped += 1,
                RecordOutcome::Failed => report.failed += 1,
            }
        }

        info!(
            records = event.records.len(),
            completed = report.completed.len(),
            failed = report.failed,
            skipped = report.skipped,
            "storage event processed"
        );
        report
    }

    #[instrument(skip_all, fields(
        event_name = record.event_name.as_deref().unwrap_or(""),
        bucket = record.s3.bucket.name.as_deref().unwrap_or(""),
        key = record.s3.object.key.as_deref().unwrap_or(""),
    ))]
    async fn handle_storage_record(&self, record: &S3EventRecord) -> RecordOutcome {
        if !storage_event::is_object_created(record) {
            debug!("skipping notification that does not create an object");
            return RecordOutcome::Skipped;
        }

        let mut invocation = Invocation::new(TriggerKind::StorageEvent);

        let location = match storage_event::record_location(record) {
            Ok(location) => location,
            Err(err) => {
                invocation.failed(&err);
                return RecordOutcome::Failed;
            }
        };

        if self.recorder.owns(&location) {
            warn!(object = %location, "skipping object written by the recorder");
            return RecordOutcome::Skipped;
        }

        let delimiter = &self.config.storage_events.filename_delimiter;
        let outcome = match storage_event::adapt_record(&*self.store, &location, delimiter).await {
            Ok(request) => self.complete(&mut invocation, request).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(completion) => RecordOutcome::Completed(completion.pair),
            Err(err) => {
                invocation.failed(&err);
                RecordOutcome::Failed
            }
        }
    }

    /// Translate and record an already-adapted request.
    pub async fn translate_request(&self, request: TranslationRequest) -> Result<Completion> {
        let mut invocation = Invocation::new(TriggerKind::Direct);
        let outcome = self.complete(&mut invocation, request).await;
        if let Err(err) = &outcome {
            invocation.failed(err);
        }
        outcome
    }

    /// `Adapted → Completed`: one translate call, then the ordered pair write.
    ///
    /// Nothing is written unless translation succeeded.
    async fn complete(
        &self,
        invocation: &mut Invocation,
        request: TranslationRequest,
    ) -> Result<Completion> {
        invocation.adapted(request.request_id())?;
        let result = translation::invoke(&*self.translator, request).await?;
        let pair = self.recorder.record(&result).await?;
        invocation.completed()?;
        Ok(Completion { result, pair })
    }

    fn respond(&self, invocation: &mut Invocation, outcome: Result<Completion>) -> GatewayResponse {
        match outcome {
            Ok(completion) => GatewayResponse::success(&completion.result, self.cors()),
            Err(err) => {
                invocation.failed(&err);
                GatewayResponse::error(&err, self.cors())
            }
        }
    }
}

enum RecordOutcome {
    Completed(StoredPair),
    Skipped,
    Failed,
}
