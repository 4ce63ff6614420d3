use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ClientResult, ReportError};

use super::result::{AgentLog, AnalysisTable, Column, ReportResult, SearchEntry, TableRow};

#[derive(Deserialize)]
struct RawResponse {
    research_results: Vec<RawSearchResult>,
    analysis_summary: String,
    analysis_tables: Map<String, Value>,
    draft_report: String,
    final_report: String,
    review_notes: String,
    #[serde(default)]
    processing_time: Option<Value>,
    #[serde(default)]
    agent_logs: Option<Value>,
}

#[derive(Deserialize)]
struct RawSearchResult {
    url: String,
    title: String,
    snippet: String,
    #[serde(default)]
    content_preview: Option<String>,
    #[serde(default)]
    fetched_text_length: Option<u64>,
}

/// Turns a decoded `/research` response body into a [`ReportResult`].
///
/// Pure: the same payload always yields an equal result. Search entries and
/// tables keep the order the payload presents them in.
#[tracing::instrument(
    name = "normalize report",
    skip(raw),
    fields(report.search_entries, report.analysis_tables)
)]
pub fn normalize(raw: &Value) -> ClientResult<ReportResult> {
    if !raw.is_object() {
        return Err(ReportError::malformed(format!(
            "expected a JSON object, got {}",
            json_type(raw)
        )));
    }

    let parsed =
        RawResponse::deserialize(raw).map_err(|e| ReportError::malformed(e.to_string()))?;

    let search_entries: Vec<SearchEntry> = parsed
        .research_results
        .into_iter()
        .map(|r| SearchEntry {
            url: r.url,
            title: r.title,
            snippet: r.snippet,
            content_preview: r.content_preview,
            fetched_text_length: r.fetched_text_length,
        })
        .collect();

    let analysis_tables = parsed
        .analysis_tables
        .into_iter()
        .map(|(name, value)| build_table(name, value))
        .collect::<ClientResult<Vec<_>>>()?;

    let span = tracing::Span::current();
    span.record("report.search_entries", search_entries.len());
    span.record("report.analysis_tables", analysis_tables.len());

    Ok(ReportResult {
        search_entries,
        analysis_summary: parsed.analysis_summary,
        analysis_tables,
        draft_report: parsed.draft_report,
        final_report: parsed.final_report,
        review_notes: parsed.review_notes,
        processing_time_seconds: parsed.processing_time.as_ref().and_then(Value::as_f64),
        agent_logs: parsed.agent_logs.map(build_agent_logs).unwrap_or_default(),
    })
}

fn build_table(name: String, value: Value) -> ClientResult<AnalysisTable> {
    let raw_rows = match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => {
            return Err(ReportError::malformed(format!(
                "analysis table {name:?} must be an array of rows, got {}",
                json_type(&other)
            )));
        }
    };

    let rows = raw_rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Object(fields) => Ok(TableRow::new(fields)),
            other => Err(ReportError::malformed(format!(
                "row {idx} of analysis table {name:?} must be an object, got {}",
                json_type(&other)
            ))),
        })
        .collect::<ClientResult<Vec<_>>>()?;

    let columns = rows
        .first()
        .map(|first| first.keys().map(Column::new).collect::<Vec<_>>())
        .unwrap_or_default();

    Ok(AnalysisTable {
        name,
        columns,
        rows,
    })
}

fn build_agent_logs(value: Value) -> Vec<AgentLog> {
    let Value::Object(agents) = value else {
        tracing::debug!("ignoring agent_logs that is not an object");
        return Vec::new();
    };

    agents
        .into_iter()
        .map(|(agent, entry)| {
            let mut details = match entry {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let status = match details.shift_remove("status") {
                Some(Value::String(s)) => Some(s),
                Some(other) => {
                    details.insert("status".to_string(), other);
                    None
                }
                None => None,
            };
            AgentLog {
                agent,
                status,
                details,
            }
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
