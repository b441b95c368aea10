//! Job-description requirement extraction.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

/// Lines at or below this many characters are not treated as requirements.
pub const MIN_REQUIREMENT_CHARS: usize = 10;

#[derive(Debug, thiserror::Error)]
#[error("unable to read job description {}: {source}", path.display())]
pub struct RequirementExtractionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequirements {
    pub file_path: PathBuf,
    pub parsed_date: NaiveDateTime,
    pub raw_text: String,
    pub requirements: Vec<String>,
    pub key_skills: Vec<String>,
}

impl JobRequirements {
    pub fn extract(file_path: &Path, raw_text: String, parsed_date: NaiveDateTime) -> Self {
        let requirements = requirement_lines(&raw_text);
        Self {
            file_path: file_path.to_path_buf(),
            parsed_date,
            raw_text,
            requirements,
            key_skills: Vec::new(),
        }
    }

    pub fn read(path: &Path, parsed_date: NaiveDateTime) -> Result<Self, RequirementExtractionError> {
        let raw_text =
            std::fs::read_to_string(path).map_err(|source| RequirementExtractionError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::extract(path, raw_text, parsed_date))
    }
}

pub fn requirement_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_REQUIREMENT_CHARS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parsed_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .expect("valid date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn keeps_trimmed_lines_longer_than_ten_characters() {
        let jd = "Must have 5 years Python\n\nGo\nExcellent communication skills";
        assert_eq!(
            requirement_lines(jd),
            vec!["Must have 5 years Python", "Excellent communication skills"]
        );
    }

    #[test]
    fn boundary_length_lines_are_excluded() {
        let jd = "   0123456789   \n0123456789A\r\n\t\t\n";
        assert_eq!(requirement_lines(jd), vec!["0123456789A"]);
    }

    #[test]
    fn extract_leaves_key_skills_empty() {
        let requirements =
            JobRequirements::extract(Path::new("jd.txt"), "Lead the platform team".into(), parsed_date());
        assert_eq!(requirements.requirements, vec!["Lead the platform team"]);
        assert!(requirements.key_skills.is_empty());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = JobRequirements::read(Path::new("./no-such-jd.txt"), parsed_date())
            .expect_err("missing file fails");
        assert_eq!(error.path, PathBuf::from("./no-such-jd.txt"));
        assert!(error.to_string().contains("no-such-jd.txt"));
    }
}
