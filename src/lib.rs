//! Client-side core of the research report generator.
//!
//! [`GenerationController`] drives one report request at a time against the
//! backend's `POST {base}/research` endpoint and publishes its state;
//! [`normalize`] shapes the response payload into an ordered [`ReportResult`]
//! that a view layer can render directly.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod telemetry;

pub use client::{ReportClient, ReportSource};
pub use config::Config;
pub use controller::{Attempt, GenerationController, GenerationState, Resolution, StateWatcher};
pub use error::{ClientResult, FailureKind, ReportError};
pub use model::{
    AnalysisTable, Cell, Column, GenerationRequest, ReportResult, ReportStyle, ResultCount,
    SearchEntry, normalize,
};
