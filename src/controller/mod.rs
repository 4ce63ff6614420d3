pub mod state;

pub use state::{Attempt, GenerationState, Resolution, StateWatcher};

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;
use tokio::sync::watch;
use tracing::Instrument;

use crate::client::{ReportClient, ReportSource};
use crate::config::Config;
use crate::error::{ClientResult, ReportError};
use crate::model::{GenerationRequest, ReportResult, ReportStyle, ResultCount, normalize};
use crate::telemetry::metrics::{
    REPORT_ANALYSIS_TABLES, REPORT_REQUESTS_TOTAL, REPORT_SUPERSEDED_TOTAL,
};

use state::Tracked;

/// Owns the request lifecycle for one report view.
///
/// Every accepted submission bumps a sequence number. When a fetch resolves,
/// its outcome is applied only if no newer submission has been accepted in
/// the meantime, so the most recent `submit` always wins regardless of the
/// order in which responses arrive. Superseded fetches are not aborted; their
/// results are dropped.
pub struct GenerationController {
    source: Arc<dyn ReportSource>,
    state: watch::Sender<Tracked>,
}

impl GenerationController {
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self {
            source,
            state: watch::Sender::new(Tracked::default()),
        }
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Ok(Self::new(Arc::new(ReportClient::new(config)?)))
    }

    /// Snapshot of the latest known state.
    pub fn state(&self) -> GenerationState {
        self.state.borrow().state.clone()
    }

    pub fn subscribe(&self) -> StateWatcher {
        StateWatcher::new(self.state.subscribe())
    }

    /// Validates the inputs, moves to `InFlight` and performs one fetch.
    ///
    /// A blank topic is rejected with [`ReportError::Validation`] before any
    /// state change or network call. Fetch failures are not returned here;
    /// they land in [`GenerationState::Failed`].
    pub async fn submit(
        &self,
        topic: &str,
        num_results: ResultCount,
        style: ReportStyle,
    ) -> ClientResult<Resolution> {
        let request = GenerationRequest::new(topic, num_results, style).inspect_err(|e| {
            tracing::debug!(error = %e, "submission rejected");
        })?;
        Ok(self.submit_request(request).await)
    }

    pub async fn submit_request(&self, request: GenerationRequest) -> Resolution {
        let attempt = self.begin(request);

        let span = tracing::info_span!(
            "report.submit",
            request.sequence = attempt.sequence,
            request.topic = %attempt.request.topic(),
            source = %self.source.name(),
            report.resolution = tracing::field::Empty,
        );

        async {
            let outcome = self
                .source
                .fetch_report(&attempt.request)
                .await
                .and_then(|raw| normalize(&raw));

            let resolution = self.resolve(attempt, outcome);
            tracing::Span::current()
                .record("report.resolution", tracing::field::debug(&resolution));
            resolution
        }
        .instrument(span)
        .await
    }

    /// Accepts `request`: discards any previous outcome, moves to `InFlight`
    /// and returns the attempt that alone may resolve it.
    pub fn begin(&self, request: GenerationRequest) -> Attempt {
        let started = Instant::now();
        let started_at = Utc::now();
        let mut sequence = 0;

        self.state.send_modify(|tracked| {
            tracked.sequence += 1;
            sequence = tracked.sequence;
            tracked.state = GenerationState::InFlight {
                request: request.clone(),
                started_at,
            };
        });

        REPORT_REQUESTS_TOTAL.add(
            1,
            &[KeyValue::new("report.style", request.style().as_str())],
        );

        tracing::info!(
            request.sequence = sequence,
            request.topic = %request.topic(),
            request.num_results = request.num_results().get(),
            request.style = %request.style(),
            "report generation started"
        );

        Attempt {
            sequence,
            request,
            started,
        }
    }

    /// Applies the outcome of `attempt` if it is still the current one.
    pub fn resolve(&self, attempt: Attempt, outcome: ClientResult<ReportResult>) -> Resolution {
        let elapsed_ms = attempt.started.elapsed().as_millis() as u64;
        let Attempt {
            sequence, request, ..
        } = attempt;

        let mut summary: Option<Result<usize, String>> = None;
        let applied = self.state.send_if_modified(|tracked| {
            if tracked.sequence != sequence || !tracked.state.is_in_flight() {
                return false;
            }
            tracked.state = match outcome {
                Ok(result) => {
                    summary = Some(Ok(result.analysis_tables.len()));
                    GenerationState::Succeeded {
                        request,
                        result: Arc::new(result),
                        elapsed_ms,
                    }
                }
                Err(err) => {
                    summary = Some(Err(err.to_string()));
                    failed_state(request, &err)
                }
            };
            true
        });

        if !applied {
            REPORT_SUPERSEDED_TOTAL.add(1, &[]);
            tracing::debug!(
                request.sequence = sequence,
                "discarding outcome of superseded request"
            );
            return Resolution::Superseded;
        }

        match summary {
            Some(Ok(tables)) => {
                REPORT_ANALYSIS_TABLES.record(tables as f64, &[]);
                tracing::info!(
                    request.sequence = sequence,
                    elapsed_ms,
                    report.analysis_tables = tables,
                    "report generation succeeded"
                );
            }
            Some(Err(message)) => {
                tracing::warn!(
                    request.sequence = sequence,
                    elapsed_ms,
                    error = %message,
                    "report generation failed"
                );
            }
            None => {}
        }

        Resolution::Applied
    }
}

fn failed_state(request: GenerationRequest, err: &ReportError) -> GenerationState {
    GenerationState::Failed {
        request,
        error_message: err.to_string(),
        kind: err.kind(),
    }
}
