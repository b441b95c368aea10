use serde::Serialize;
use tracing::{debug, warn};

use super::{DocumentError, Region, SlideDocument};
use crate::cv::{CvDocument, SectionName};
use crate::instructions::{normalize_key, MappingRule, RuleKind, RuleTable};
use crate::job_description::JobRequirements;

pub const DEFAULT_TITLE: &str = "CV Summary";
pub const TITLE_FIELD: &str = "title";
pub const BODY_FIELD: &str = "body";
/// Pseudo-section resolving to the job description's requirement lines.
pub const JOB_REQUIREMENTS_SECTION: &str = "job_requirements";
pub const PREFERRED_BLANK_LAYOUT: usize = 6;

/// Layout used when the template has no slides: index 6 when available,
/// otherwise the last layout.
pub fn blank_layout_index(layout_count: usize) -> Option<usize> {
    layout_count
        .checked_sub(1)
        .map(|last| last.min(PREFERRED_BLANK_LAYOUT))
}

/// Fixed geometry the engine writes into.
#[derive(Debug, Clone)]
pub struct SlideLayout {
    pub title: Region,
    pub body: Region,
    pub default_title: String,
}

impl Default for SlideLayout {
    fn default() -> Self {
        Self {
            title: Region::from_inches(1, 1, 8, 1),
            body: Region::from_inches(1, 2, 8, 4),
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Text resolved for one slide field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContent {
    pub field: String,
    pub section: String,
    pub text: String,
}

impl FieldContent {
    /// Body rendering: a section heading line followed by the content, or a
    /// "No <section> available" line when the content is empty. Fields with
    /// no source section (static text) carry no heading and fall back to the
    /// field name.
    pub fn render(&self) -> String {
        let key = normalize_key(&self.section);
        let subject = if key.is_empty() {
            normalize_key(&self.field)
        } else {
            key.clone()
        };
        let content = if self.text.trim().is_empty() {
            format!("No {} available", subject.replace(['_', '-'], " "))
        } else {
            self.text.clone()
        };

        if key.is_empty() {
            content
        } else {
            format!("{}:\n{}", section_label(&key), content)
        }
    }
}

fn section_label(key: &str) -> String {
    if let Some(section) = SectionName::from_key(key) {
        return section.label().to_string();
    }

    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// What happened to one rule while planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleApplication {
    pub index: usize,
    pub field: String,
    pub kind: RuleKind,
    pub written: bool,
}

/// Field contents resolved from the rule table before anything touches the
/// document. Fields keep the order in which they were first written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlidePlan {
    fields: Vec<FieldContent>,
    applications: Vec<RuleApplication>,
}

impl SlidePlan {
    /// Seeds the body with the CV summary, then applies every rule in order.
    /// Later rules overwrite earlier writes to the same field.
    pub fn build(cv: &CvDocument, rules: &RuleTable, job: Option<&JobRequirements>) -> Self {
        let mut plan = Self {
            fields: Vec::new(),
            applications: Vec::with_capacity(rules.len()),
        };
        plan.write(
            BODY_FIELD.to_string(),
            SectionName::Summary.key().to_string(),
            cv.section(SectionName::Summary).to_string(),
        );

        for (index, rule) in rules.rules().iter().enumerate() {
            plan.apply(index, rule, cv, job);
        }

        plan
    }

    fn apply(
        &mut self,
        index: usize,
        rule: &MappingRule,
        cv: &CvDocument,
        job: Option<&JobRequirements>,
    ) {
        let field = normalize_key(&rule.field);
        let kind = rule.kind();

        if field.is_empty() {
            warn!(row = index, "instruction rule has no target field, skipping");
            self.applications.push(RuleApplication {
                index,
                field,
                kind,
                written: false,
            });
            return;
        }

        let source = resolve_section(cv, job, &rule.section);
        let written = match kind.apply(&source) {
            Some(text) => {
                debug!(row = index, field = %field, section = %rule.section, "applying rule");
                self.write(field.clone(), rule.section.trim().to_string(), text);
                true
            }
            None => {
                warn!(row = index, field = %field, rule = %rule.rule, "unknown rule, field left untouched");
                false
            }
        };

        self.applications.push(RuleApplication {
            index,
            field,
            kind,
            written,
        });
    }

    fn write(&mut self, field: String, section: String, text: String) {
        match self.fields.iter_mut().find(|content| content.field == field) {
            Some(existing) => {
                existing.section = section;
                existing.text = text;
            }
            None => self.fields.push(FieldContent {
                field,
                section,
                text,
            }),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldContent> {
        let key = normalize_key(name);
        self.fields.iter().find(|content| content.field == key)
    }

    pub fn title_text(&self) -> Option<&str> {
        self.field(TITLE_FIELD).map(|content| content.text.as_str())
    }

    /// Every field except the title, in first-write order.
    pub fn body_fields(&self) -> Vec<&FieldContent> {
        self.fields
            .iter()
            .filter(|content| content.field != TITLE_FIELD)
            .collect()
    }

    pub fn applications(&self) -> &[RuleApplication] {
        &self.applications
    }
}

fn resolve_section(cv: &CvDocument, job: Option<&JobRequirements>, section: &str) -> String {
    if normalize_key(section) == JOB_REQUIREMENTS_SECTION {
        return job
            .map(|requirements| requirements.requirements.join("\n"))
            .unwrap_or_default();
    }
    cv.section_text(section).to_string()
}

/// Summary of what the engine wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationOutcome {
    pub slide_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_from_layout: Option<usize>,
    pub title: String,
    pub title_in_placeholder: bool,
    pub fields: Vec<String>,
    pub plan: SlidePlan,
}

#[derive(Debug, Clone, Default)]
pub struct PopulationEngine {
    layout: SlideLayout,
}

impl PopulationEngine {
    pub fn new(layout: SlideLayout) -> Self {
        Self { layout }
    }

    /// Fills the first slide of `document`, creating it when the template has
    /// none. The document is mutated in place; a failure part-way leaves it
    /// partially written and it should be discarded.
    pub fn populate(
        &self,
        document: &mut dyn SlideDocument,
        cv: &CvDocument,
        rules: &RuleTable,
        job: Option<&JobRequirements>,
    ) -> Result<PopulationOutcome, DocumentError> {
        let (slide_index, created_from_layout) = self.target_slide(document)?;
        let plan = SlidePlan::build(cv, rules, job);

        let title = plan
            .title_text()
            .unwrap_or(self.layout.default_title.as_str())
            .to_string();
        let title_in_placeholder = document.has_title_placeholder(slide_index)?;
        if title_in_placeholder {
            if let Some(text) = plan.title_text() {
                document.set_title_text(slide_index, text)?;
            }
        } else {
            document.add_text_region(slide_index, self.layout.title, &title, false)?;
        }

        let body_fields = plan.body_fields();
        let bands = self.layout.body.split_vertically(body_fields.len());
        for (content, band) in body_fields.iter().zip(bands) {
            document.add_text_region(slide_index, band, &content.render(), true)?;
        }

        let fields = body_fields
            .iter()
            .map(|content| content.field.clone())
            .collect();

        Ok(PopulationOutcome {
            slide_index,
            created_from_layout,
            title,
            title_in_placeholder,
            fields,
            plan,
        })
    }

    fn target_slide(
        &self,
        document: &mut dyn SlideDocument,
    ) -> Result<(usize, Option<usize>), DocumentError> {
        if document.slide_count() > 0 {
            return Ok((0, None));
        }

        let layout =
            blank_layout_index(document.layout_count()).ok_or(DocumentError::NoLayouts)?;
        let slide = document.add_slide(layout)?;
        debug!(layout, slide, "template had no slides, created one");
        Ok((slide, Some(layout)))
    }
}
