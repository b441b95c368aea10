//! Durable JSON record of a run: its inputs, every trace entry, and totals.

pub mod views;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

use crate::trace::TraceLog;

pub use views::{ReportInputs, ReportSummary, TraceabilityReport};

#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    #[error("unable to serialize traceability report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unable to write traceability report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts gathered by the pipeline that the trace log alone cannot answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub cv_sections_extracted: usize,
    pub instruction_rules: usize,
}

impl TraceabilityReport {
    pub fn build(
        generated_at: NaiveDateTime,
        inputs: ReportInputs,
        trace: &TraceLog,
        counts: RunCounts,
    ) -> Self {
        Self {
            generated_at,
            inputs,
            processing_log: trace.entries().to_vec(),
            summary: ReportSummary {
                total_steps: trace.len(),
                cv_sections_extracted: counts.cv_sections_extracted,
                instruction_rules: counts.instruction_rules,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, ReportWriteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportWriteError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ReportWriteError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), steps = self.summary.total_steps, "traceability report written");
        Ok(())
    }
}
