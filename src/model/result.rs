use serde::Serialize;
use serde_json::{Map, Value};

pub const REPORT_FILE_NAME: &str = "research-report.md";

/// Normalized snapshot of one successful generation. Built once by
/// [`normalize`](super::normalize::normalize) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResult {
    pub search_entries: Vec<SearchEntry>,
    pub analysis_summary: String,
    pub analysis_tables: Vec<AnalysisTable>,
    pub draft_report: String,
    pub final_report: String,
    pub review_notes: String,
    pub processing_time_seconds: Option<f64>,
    pub agent_logs: Vec<AgentLog>,
}

impl ReportResult {
    pub fn processing_time_label(&self) -> Option<String> {
        self.processing_time_seconds
            .map(|secs| format!("Generated in {secs:.2} seconds"))
    }

    /// File name and contents for saving the final report.
    pub fn final_report_markdown(&self) -> (&'static str, &str) {
        (REPORT_FILE_NAME, &self.final_report)
    }

    pub fn table(&self, name: &str) -> Option<&AnalysisTable> {
        self.analysis_tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub content_preview: Option<String>,
    pub fetched_text_length: Option<u64>,
}

impl SearchEntry {
    pub fn content_length_label(&self) -> Option<String> {
        self.fetched_text_length
            .map(|len| format!("Content length: {len} characters"))
    }
}

/// A named table from `analysis_tables`. The column set comes from the first
/// row's keys; later rows are kept as received, even when their keys differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    /// Cells in this column should be rendered as links.
    pub link: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let link = name.eq_ignore_ascii_case("url");
        Self { name, link }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableRow(Map<String, Value>);

impl TableRow {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// One rendered cell: the value under a column of the table's column set,
/// plus the link hint carried from the column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<'a> {
    pub column: &'a str,
    pub value: Option<&'a Value>,
    pub link: bool,
}

impl Cell<'_> {
    pub fn text(&self) -> String {
        match self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl AnalysisTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Cells of `row` in column order. Keys of `row` outside the column set
    /// are not visited; columns the row lacks yield `value: None`.
    pub fn cells<'a>(&'a self, row: &'a TableRow) -> impl Iterator<Item = Cell<'a>> + 'a {
        self.columns.iter().map(move |column| Cell {
            column: &column.name,
            value: row.get(&column.name),
            link: column.link,
        })
    }

    /// Heading text: underscores become spaces and every word is capitalized.
    pub fn display_name(&self) -> String {
        self.name
            .split('_')
            .flat_map(|part| part.split(' '))
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentLog {
    pub agent: String,
    pub status: Option<String>,
    pub details: Map<String, Value>,
}
