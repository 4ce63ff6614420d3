use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClientResult, ReportError};

/// Number of search results the backend should fetch. Only the values offered
/// by the topic form are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ResultCount {
    Three,
    #[default]
    Five,
    Seven,
    Ten,
}

impl ResultCount {
    pub const ALL: [ResultCount; 4] = [
        ResultCount::Three,
        ResultCount::Five,
        ResultCount::Seven,
        ResultCount::Ten,
    ];

    pub fn get(self) -> u32 {
        match self {
            ResultCount::Three => 3,
            ResultCount::Five => 5,
            ResultCount::Seven => 7,
            ResultCount::Ten => 10,
        }
    }
}

impl TryFrom<u32> for ResultCount {
    type Error = ReportError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(ResultCount::Three),
            5 => Ok(ResultCount::Five),
            7 => Ok(ResultCount::Seven),
            10 => Ok(ResultCount::Ten),
            other => Err(ReportError::Validation(format!(
                "num_results must be one of 3, 5, 7 or 10 (got {other})"
            ))),
        }
    }
}

impl From<ResultCount> for u32 {
    fn from(count: ResultCount) -> Self {
        count.get()
    }
}

impl fmt::Display for ResultCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    #[default]
    Concise,
    Detailed,
    Academic,
}

impl ReportStyle {
    pub const ALL: [ReportStyle; 3] = [
        ReportStyle::Concise,
        ReportStyle::Detailed,
        ReportStyle::Academic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStyle::Concise => "concise",
            ReportStyle::Detailed => "detailed",
            ReportStyle::Academic => "academic",
        }
    }
}

impl FromStr for ReportStyle {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" => Ok(ReportStyle::Concise),
            "detailed" => Ok(ReportStyle::Detailed),
            "academic" => Ok(ReportStyle::Academic),
            _ => Err(ReportError::Validation(format!(
                "report_style must be one of concise, detailed or academic (got {s:?})"
            ))),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one report generation. Immutable once built; the topic is
/// kept exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    num_results: ResultCount,
    style: ReportStyle,
}

/// Body of `POST {base}/research`.
#[derive(Debug, Serialize)]
pub struct WireRequest<'a> {
    pub topic: &'a str,
    pub num_results: u32,
    pub report_style: &'a str,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        num_results: ResultCount,
        style: ReportStyle,
    ) -> ClientResult<Self> {
        let topic = topic.into();
        validate_topic(&topic)?;
        Ok(Self {
            topic,
            num_results,
            style,
        })
    }

    /// Builds a request from unchecked form values.
    pub fn parse(topic: &str, num_results: u32, style: &str) -> ClientResult<Self> {
        let num_results = ResultCount::try_from(num_results)?;
        let style = style.parse::<ReportStyle>()?;
        Self::new(topic, num_results, style)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn num_results(&self) -> ResultCount {
        self.num_results
    }

    pub fn style(&self) -> ReportStyle {
        self.style
    }

    pub fn wire_body(&self) -> WireRequest<'_> {
        WireRequest {
            topic: &self.topic,
            num_results: self.num_results.get(),
            report_style: self.style.as_str(),
        }
    }
}

pub(crate) fn validate_topic(topic: &str) -> ClientResult<()> {
    if topic.trim().is_empty() {
        return Err(ReportError::Validation("topic must not be empty".into()));
    }
    Ok(())
}
