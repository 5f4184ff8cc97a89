//! Invocation lifecycle.
//!
//! State transitions:
//! ```text
//! RECEIVED → ADAPTED → COMPLETED
//!     ↓          ↓
//!   FAILED     FAILED
//! ```

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::triggers::TriggerKind;
use crate::types::{Error, RequestId, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    Received,
    Adapted,
    Completed,
    Failed,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, InvocationState::Completed | InvocationState::Failed)
    }

    pub fn can_transition_to(self, to: InvocationState) -> bool {
        match (self, to) {
            (InvocationState::Received, InvocationState::Adapted) => true,
            (InvocationState::Adapted, InvocationState::Completed) => true,
            (from, InvocationState::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Tracks one unit of work: the whole event for gateway/direct triggers,
/// one record for storage events.
#[derive(Debug)]
pub struct Invocation {
    trigger: TriggerKind,
    state: InvocationState,
    request_id: Option<RequestId>,
}

impl Invocation {
    pub fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            state: InvocationState::Received,
            request_id: None,
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// `Received → Adapted`, remembering the correlating id.
    pub fn adapted(&mut self, request_id: &RequestId) -> Result<()> {
        self.request_id = Some(request_id.clone());
        self.advance(InvocationState::Adapted)
    }

    /// `Adapted → Completed`.
    pub fn completed(&mut self) -> Result<()> {
        self.advance(InvocationState::Completed)
    }

    /// Move to `Failed` and log the error.
    ///
    /// Without a response channel the log record is the only trace of the
    /// failure, so it is always emitted at `error`.
    pub fn failed(&mut self, err: &Error) {
        let request_id = self
            .request_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();

        if self.trigger.has_response_channel() && err.is_client_error() {
            warn!(
                trigger = %self.trigger,
                request_id = %request_id,
                from = ?self.state,
                kind = err.kind(),
                error = %err,
                "invocation rejected"
            );
        } else {
            error!(
                trigger = %self.trigger,
                request_id = %request_id,
                from = ?self.state,
                kind = err.kind(),
                error = %err,
                "invocation failed"
            );
        }

        if self.state.can_transition_to(InvocationState::Failed) {
            self.state = InvocationState::Failed;
        }
    }

    fn advance(&mut self, to: InvocationState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(Error::internal(format!(
                "invalid invocation transition from {:?} to {:?}",
                self.state, to
            )));
        }
        debug!(trigger = %self.trigger, from = ?self.state, to = ?to, "invocation state");
        self.state = to;
        Ok(())
    }
}
