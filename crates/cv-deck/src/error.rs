use std::path::PathBuf;

use crate::config::ConfigError;
use crate::instructions::InstructionFormatError;
use crate::job_description::RequirementExtractionError;
use crate::report::ReportWriteError;
use crate::slides::DocumentError;
use crate::telemetry::TelemetryError;
use crate::trace::TraceStep;

/// Every way a run can fail. All of them are fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input validation failed for {}: {reason}", path.display())]
    InputValidation { path: PathBuf, reason: String },
    #[error("cv_parsing failed for {}: {source}", path.display())]
    CvExtraction {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("instruction_parsing failed: {0}")]
    InstructionFormat(#[from] InstructionFormatError),
    #[error("jd_parsing failed: {0}")]
    RequirementExtraction(#[from] RequirementExtractionError),
    #[error("{stage} failed: {source}")]
    Generation {
        stage: TraceStep,
        #[source]
        source: DocumentError,
    },
    #[error("report_writing failed: {0}")]
    ReportWrite(#[from] ReportWriteError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn invalid_input(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn stage(stage: TraceStep, source: DocumentError) -> Self {
        Self::Generation { stage, source }
    }

    /// Pipeline stage the error belongs to, when it is tied to one.
    pub fn step(&self) -> Option<TraceStep> {
        match self {
            Self::CvExtraction { .. } => Some(TraceStep::CvParsing),
            Self::InstructionFormat(_) => Some(TraceStep::InstructionParsing),
            Self::RequirementExtraction(_) => Some(TraceStep::JdParsing),
            Self::Generation { stage, .. } => Some(stage.clone()),
            _ => None,
        }
    }
}
