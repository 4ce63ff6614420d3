pub mod normalize;
pub mod request;
pub mod result;

pub use normalize::normalize;
pub use request::{GenerationRequest, ReportStyle, ResultCount, WireRequest};
pub use result::{AgentLog, AnalysisTable, Cell, Column, ReportResult, SearchEntry, TableRow};
