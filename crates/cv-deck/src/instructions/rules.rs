use serde::Serialize;

use super::normalizer::normalize_directive;

pub const BULLET: &str = "\u{2022} ";

/// Transformation applied to a section's text before it lands in a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "param", rename_all = "snake_case")]
pub enum RuleKind {
    /// Section text verbatim. Blank directives default here.
    Copy,
    /// First `n` characters of the section text.
    TruncateTo(usize),
    /// One bullet per non-blank line.
    BulletList,
    /// Ignores the section and writes the rule's value.
    Static(String),
    /// Anything unrecognized; leaves the field untouched.
    Unknown(String),
}

impl RuleKind {
    pub fn parse(rule: &str, value: &str) -> Self {
        match normalize_directive(rule).as_str() {
            "" | "copy" => Self::Copy,
            "truncate" | "truncate-to" => match value.trim().parse::<usize>() {
                Ok(limit) => Self::TruncateTo(limit),
                Err(_) => Self::Unknown(rule.trim().to_string()),
            },
            "bullet-list" | "bullets" | "bullet" => Self::BulletList,
            "static" | "static-text" | "override" => Self::Static(value.to_string()),
            _ => Self::Unknown(rule.trim().to_string()),
        }
    }

    /// Returns `None` when the rule does not produce field text.
    pub fn apply(&self, section_text: &str) -> Option<String> {
        match self {
            Self::Copy => Some(section_text.to_string()),
            Self::TruncateTo(limit) => Some(section_text.chars().take(*limit).collect()),
            Self::BulletList => Some(
                section_text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| format!("{BULLET}{line}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Self::Static(text) => Some(text.clone()),
            Self::Unknown(_) => None,
        }
    }
}
