use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Server error: HTTP {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`ReportError`], kept alongside the message in
/// the `Failed` state so consumers can branch without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Network,
    Server,
    Decode,
    MalformedResponse,
    Config,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Network => "network",
            FailureKind::Server => "server",
            FailureKind::Decode => "decode",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Config => "config",
        }
    }
}

impl ReportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReportError::Validation(_) => FailureKind::Validation,
            ReportError::Network(_) => FailureKind::Network,
            ReportError::Server { .. } => FailureKind::Server,
            ReportError::Decode(_) => FailureKind::Decode,
            ReportError::MalformedResponse(_) => FailureKind::MalformedResponse,
            ReportError::Config(_) => FailureKind::Config,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ReportError::MalformedResponse(msg.into())
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ReportError::Server {
                status: status.as_u16(),
                detail: None,
            };
        }
        if err.is_decode() {
            return ReportError::Decode(err.to_string());
        }
        let cause = if err.is_timeout() {
            "request timed out"
        } else if err.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        ReportError::Network(format!("{cause}: {err}"))
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.trim().is_empty() => format!(" ({})", d.trim()),
        _ => String::new(),
    }
}

pub type ClientResult<T> = Result<T, ReportError>;
