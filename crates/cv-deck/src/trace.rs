//! Append-only audit trail of the pipeline stages executed during one run.

use chrono::{Local, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::config::DEFAULT_SUMMARY_LIMIT;

pub const ELLIPSIS: &str = "...";

/// Source of wall-clock time for a run, so timestamps can be pinned in tests.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStep {
    CvParsing,
    InstructionParsing,
    JdParsing,
    PptGeneration,
    Other(String),
}

impl TraceStep {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CvParsing => "cv_parsing",
            Self::InstructionParsing => "instruction_parsing",
            Self::JdParsing => "jd_parsing",
            Self::PptGeneration => "ppt_generation",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl std::fmt::Display for TraceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TraceStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub timestamp: NaiveDateTime,
    pub step: TraceStep,
    pub description: String,
    pub data_summary: String,
}

#[derive(Debug, Clone)]
pub struct TraceLog {
    entries: Vec<TraceEntry>,
    summary_limit: usize,
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::with_summary_limit(DEFAULT_SUMMARY_LIMIT)
    }
}

impl TraceLog {
    pub fn with_summary_limit(summary_limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            summary_limit,
        }
    }

    /// Appends an entry whose data summary is the compact JSON rendering of
    /// `data`, truncated to the configured limit.
    pub fn record<T: Serialize + ?Sized>(
        &mut self,
        timestamp: NaiveDateTime,
        step: TraceStep,
        description: impl Into<String>,
        data: &T,
    ) -> &TraceEntry {
        let rendered = serde_json::to_string(data)
            .unwrap_or_else(|err| format!("<unserializable data: {err}>"));
        let entry = TraceEntry {
            timestamp,
            step,
            description: description.into(),
            data_summary: truncate_summary(&rendered, self.summary_limit),
        };
        tracing::debug!(step = %entry.step, description = %entry.description, "trace entry recorded");
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps at most `limit` Unicode scalar values, marking the cut with `...`.
pub fn truncate_summary(data: &str, limit: usize) -> String {
    match data.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &data[..cut], ELLIPSIS),
        None => data.to_string(),
    }
}
