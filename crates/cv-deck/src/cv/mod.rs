//! CV content extraction: raw source text in, sectioned [`CvDocument`] out.

mod reader;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

pub use reader::{ContentExtractor, CvSource, CvSourceFormat, FileContentExtractor};

/// Characters of raw text kept as the summary section.
pub const SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
}

impl SectionName {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Summary,
            Self::Experience,
            Self::Education,
            Self::Skills,
            Self::Certifications,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Experience => "experience",
            Self::Education => "education",
            Self::Skills => "skills",
            Self::Certifications => "certifications",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Experience => "Experience",
            Self::Education => "Education",
            Self::Skills => "Skills",
            Self::Certifications => "Certifications",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|section| section.key() == normalized)
    }
}

/// Normalized CV content. Every [`SectionName`] is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CvDocument {
    source_path: PathBuf,
    source_name: String,
    parsed_at: NaiveDateTime,
    sections: BTreeMap<SectionName, String>,
    raw_text: String,
}

impl CvDocument {
    pub fn extract(path: &Path, source: CvSource, parsed_at: NaiveDateTime) -> Self {
        let sections = extract_sections(&source.raw_text);
        Self {
            source_path: path.to_path_buf(),
            source_name: reader::display_name(path),
            parsed_at,
            sections,
            raw_text: source.raw_text,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn parsed_at(&self) -> NaiveDateTime {
        self.parsed_at
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn sections(&self) -> &BTreeMap<SectionName, String> {
        &self.sections
    }

    pub fn section(&self, name: SectionName) -> &str {
        self.sections.get(&name).map(String::as_str).unwrap_or("")
    }

    /// Looks a section up by its spreadsheet key; unknown keys read as empty.
    pub fn section_text(&self, key: &str) -> &str {
        SectionName::from_key(key)
            .map(|name| self.section(name))
            .unwrap_or("")
    }
}

// Only the summary is segmented today; the remaining sections stay empty until
// real segmentation lands.
fn extract_sections(text: &str) -> BTreeMap<SectionName, String> {
    let mut sections: BTreeMap<SectionName, String> = SectionName::ordered()
        .into_iter()
        .map(|name| (name, String::new()))
        .collect();

    let summary = text.chars().take(SUMMARY_CHARS).collect();
    sections.insert(SectionName::Summary, summary);
    sections
}
