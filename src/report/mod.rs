//! Run reports.

pub mod generator;

pub use generator::{generate_json_report, generate_text_report};

use crate::aggregate::AggregateState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// When dispatch started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time until the last request completed.
    pub duration_seconds: f64,
    /// Number of descriptors handed to the dispatcher.
    pub requests_dispatched: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub has_data: bool,
    pub state: AggregateState,
}

impl RunReport {
    pub fn new(metadata: RunMetadata, state: AggregateState) -> Self {
        Self {
            metadata,
            has_data: state.has_data(),
            state,
        }
    }
}
