use std::time::Instant;

use opentelemetry::KeyValue;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use super::ReportSource;
use crate::config::Config;
use crate::error::{ClientResult, ReportError};
use crate::model::GenerationRequest;
use crate::telemetry::metrics::{REPORT_FAILURES, REPORT_REQUEST_DURATION};

pub struct ReportClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl ReportClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self::with_endpoint(config.endpoint_url()?))
    }

    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: &GenerationRequest, request_id: Uuid) -> ClientResult<Value> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header("x-request-id", request_id.to_string())
            .json(&request.wire_body())
            .send()
            .await?;

        let status = response.status();
        tracing::Span::current().record("http.response.status_code", status.as_u16() as i64);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ReportError::Server {
                status: status.as_u16(),
                detail: extract_detail(&error_body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReportError::Network(format!("failed to read response body: {e}")))?;

        serde_json::from_slice::<Value>(&body).map_err(|e| ReportError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ReportSource for ReportClient {
    async fn fetch_report(&self, request: &GenerationRequest) -> ClientResult<Value> {
        let request_id = Uuid::new_v4();
        let start = Instant::now();

        let span = tracing::info_span!(
            "report.fetch",
            otel.name = "POST /research",
            http.request.method = "POST",
            url.full = %self.endpoint,
            request.id = %request_id,
            request.topic = %request.topic(),
            request.num_results = request.num_results().get(),
            request.style = %request.style(),
            http.response.status_code = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        let result = self.send(request, request_id).instrument(span.clone()).await;
        let duration = start.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                span.record("otel.status_code", "OK");
                REPORT_REQUEST_DURATION.record(duration, &[KeyValue::new("outcome", "ok")]);
                tracing::info!(
                    parent: &span,
                    duration_s = duration,
                    "report response received"
                );
            }
            Err(err) => {
                let kind = err.kind().as_str();
                span.record("otel.status_code", "ERROR");
                span.record("error.type", kind);
                REPORT_REQUEST_DURATION.record(duration, &[KeyValue::new("outcome", "error")]);
                REPORT_FAILURES.add(1, &[KeyValue::new("error.type", kind)]);
                tracing::warn!(
                    parent: &span,
                    error = %err,
                    duration_s = duration,
                    "report request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Pulls a readable message out of an error body. FastAPI sends
/// `{"detail": ...}`; anything else is passed through, shortened.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed)
        && let Some(detail) = map.get("detail")
    {
        return match detail {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(truncate(&other.to_string(), 300)),
        };
    }

    Some(truncate(trimmed, 300))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
