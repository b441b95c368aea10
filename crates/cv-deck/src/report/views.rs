use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::trace::TraceEntry;

/// Sources consumed by a run, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInputs {
    pub cv: PathBuf,
    pub instructions: PathBuf,
    pub template: PathBuf,
    /// Serialized as `null` when no job description was supplied.
    pub job_description: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_steps: usize,
    pub cv_sections_extracted: usize,
    pub instruction_rules: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceabilityReport {
    pub generated_at: NaiveDateTime,
    pub inputs: ReportInputs,
    pub processing_log: Vec<TraceEntry>,
    pub summary: ReportSummary,
}
