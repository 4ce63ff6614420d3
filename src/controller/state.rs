use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::FailureKind;
use crate::model::{GenerationRequest, ReportResult};

/// Lifecycle of the controller's single generation slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    InFlight {
        request: GenerationRequest,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        request: GenerationRequest,
        result: Arc<ReportResult>,
        elapsed_ms: u64,
    },
    Failed {
        request: GenerationRequest,
        error_message: String,
        kind: FailureKind,
    },
}

impl GenerationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GenerationState::InFlight { .. })
    }

    pub fn request(&self) -> Option<&GenerationRequest> {
        match self {
            GenerationState::Idle => None,
            GenerationState::InFlight { request, .. }
            | GenerationState::Succeeded { request, .. }
            | GenerationState::Failed { request, .. } => Some(request),
        }
    }

    pub fn result(&self) -> Option<&ReportResult> {
        match self {
            GenerationState::Succeeded { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            GenerationState::Failed { error_message, .. } => Some(error_message.as_str()),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::InFlight { .. } => "in_flight",
            GenerationState::Succeeded { .. } => "succeeded",
            GenerationState::Failed { .. } => "failed",
        }
    }
}

/// What happened to a resolution handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome became the current state.
    Applied,
    /// A newer request was submitted first; the outcome was dropped.
    Superseded,
}

/// Token for one accepted submission. Only the attempt carrying the current
/// sequence number may resolve the state.
#[derive(Debug)]
pub struct Attempt {
    pub(crate) sequence: u64,
    pub(crate) request: GenerationRequest,
    pub(crate) started: Instant,
}

impl Attempt {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

#[derive(Debug, Default)]
pub(crate) struct Tracked {
    pub(crate) sequence: u64,
    pub(crate) state: GenerationState,
}

/// Read side of the controller's state.
#[derive(Debug, Clone)]
pub struct StateWatcher {
    rx: watch::Receiver<Tracked>,
}

impl StateWatcher {
    pub(crate) fn new(rx: watch::Receiver<Tracked>) -> Self {
        Self { rx }
    }

    pub fn current(&self) -> GenerationState {
        self.rx.borrow().state.clone()
    }

    /// Waits for the next state change. `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<GenerationState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state.clone())
    }

    /// Waits until `predicate` holds for the current state, which may already
    /// be the case.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&GenerationState) -> bool,
    ) -> Option<GenerationState> {
        let tracked = self
            .rx
            .wait_for(|tracked| predicate(&tracked.state))
            .await
            .ok()?;
        Some(tracked.state.clone())
    }
}
