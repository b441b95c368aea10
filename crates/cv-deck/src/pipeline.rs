//! One CV → deck run: validate, parse each input, populate the slide, then
//! persist the presentation followed by the traceability report.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde_json::json;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::cv::{ContentExtractor, CvDocument, CvSource, FileContentExtractor};
use crate::error::PipelineError;
use crate::instructions::{InstructionSource, RuleTable, WorkbookInstructionSource};
use crate::job_description::JobRequirements;
use crate::report::{ReportInputs, RunCounts, TraceabilityReport};
use crate::slides::{
    DeckProvider, DocumentError, GeneratedArtifacts, PopulationEngine, PopulationOutcome,
    PptxDeckProvider,
};
use crate::trace::{Clock, SystemClock, TraceLog, TraceStep};

const INSTRUCTION_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];
const TEMPLATE_EXTENSION: &str = "pptx";
const FILE_TIMESTAMP: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    pub cv: PathBuf,
    pub instructions: PathBuf,
    pub template: PathBuf,
    pub job_description: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl RunInputs {
    pub fn presentation_path(&self, stamp: NaiveDateTime) -> PathBuf {
        self.output_dir
            .join(format!("CV_Presentation_{}.pptx", stamp.format(FILE_TIMESTAMP)))
    }

    pub fn report_path(&self, stamp: NaiveDateTime) -> PathBuf {
        self.output_dir
            .join(format!("Traceability_Report_{}.json", stamp.format(FILE_TIMESTAMP)))
    }
}

/// External readers and writers a run depends on.
#[derive(Debug)]
pub struct Collaborators {
    pub extractor: Box<dyn ContentExtractor>,
    pub instructions: Box<dyn InstructionSource>,
    pub decks: Box<dyn DeckProvider>,
}

impl Collaborators {
    pub fn filesystem() -> Self {
        Self {
            extractor: Box::new(FileContentExtractor),
            instructions: Box::new(WorkbookInstructionSource),
            decks: Box::new(PptxDeckProvider),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::filesystem()
    }
}

#[derive(Debug)]
pub struct CvAutomation<C: Clock = SystemClock> {
    inputs: RunInputs,
    clock: C,
    collaborators: Collaborators,
    engine: PopulationEngine,
    trace: TraceLog,
    cv: Option<CvDocument>,
    rules: Option<RuleTable>,
    job: Option<JobRequirements>,
}

impl CvAutomation<SystemClock> {
    pub fn new(inputs: RunInputs) -> Self {
        Self::with_clock(inputs, SystemClock)
    }

    pub fn from_config(inputs: RunInputs, config: &AppConfig) -> Self {
        Self::new(inputs).with_summary_limit(config.trace.summary_limit)
    }
}

impl<C: Clock> CvAutomation<C> {
    pub fn with_clock(inputs: RunInputs, clock: C) -> Self {
        Self {
            inputs,
            clock,
            collaborators: Collaborators::filesystem(),
            engine: PopulationEngine::default(),
            trace: TraceLog::default(),
            cv: None,
            rules: None,
            job: None,
        }
    }

    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn with_engine(mut self, engine: PopulationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_summary_limit(mut self, summary_limit: usize) -> Self {
        self.trace = TraceLog::with_summary_limit(summary_limit);
        self
    }

    pub fn inputs(&self) -> &RunInputs {
        &self.inputs
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn cv(&self) -> Option<&CvDocument> {
        self.cv.as_ref()
    }

    pub fn rules(&self) -> Option<&RuleTable> {
        self.rules.as_ref()
    }

    pub fn job_requirements(&self) -> Option<&JobRequirements> {
        self.job.as_ref()
    }

    /// Checks existence and extensions of every input. Leaves the trace untouched.
    pub fn validate_inputs(&self) -> Result<(), PipelineError> {
        info!("validating input files");
        let inputs = &self.inputs;

        require_file(&inputs.cv, "CV file not found")?;
        require_file(&inputs.instructions, "instructions file not found")?;
        if !has_extension(&inputs.instructions, &INSTRUCTION_EXTENSIONS) {
            return Err(PipelineError::invalid_input(
                &inputs.instructions,
                "instructions must be an Excel workbook (.xlsx or .xls)",
            ));
        }
        require_file(&inputs.template, "template file not found")?;
        if !has_extension(&inputs.template, &[TEMPLATE_EXTENSION]) {
            return Err(PipelineError::invalid_input(
                &inputs.template,
                "template must be a PowerPoint file (.pptx)",
            ));
        }
        if let Some(job_description) = &inputs.job_description {
            require_file(job_description, "job description file not found")?;
        }

        info!("all input files validated");
        Ok(())
    }

    pub fn parse_cv(&mut self) -> Result<&CvDocument, PipelineError> {
        info!(path = %self.inputs.cv.display(), "parsing CV");
        let source = self
            .collaborators
            .extractor
            .read(&self.inputs.cv)
            .map_err(|source| PipelineError::CvExtraction {
                path: self.inputs.cv.clone(),
                source,
            })?;

        let now = self.clock.now();
        let cv = CvDocument::extract(&self.inputs.cv, source, now);
        self.trace.record(now, TraceStep::CvParsing, "Parsed CV file", &cv);
        Ok(&*self.cv.insert(cv))
    }

    pub fn parse_instructions(&mut self) -> Result<&RuleTable, PipelineError> {
        info!(path = %self.inputs.instructions.display(), "parsing instructions");
        let rows = self
            .collaborators
            .instructions
            .read_rows(&self.inputs.instructions)?;

        let now = self.clock.now();
        let table = RuleTable::from_rows(&self.inputs.instructions, rows, now);
        info!(rules = table.len(), "instruction rules parsed");
        self.trace.record(
            now,
            TraceStep::InstructionParsing,
            "Parsed instruction file",
            &table,
        );
        Ok(&*self.rules.insert(table))
    }

    /// Returns `None` without touching the trace when no job description was given.
    pub fn parse_job_description(&mut self) -> Result<Option<&JobRequirements>, PipelineError> {
        let Some(path) = self.inputs.job_description.clone() else {
            info!("no job description supplied, skipping");
            return Ok(None);
        };
        info!(path = %path.display(), "parsing job description");

        let now = self.clock.now();
        let requirements = JobRequirements::read(&path, now)?;
        self.trace.record(
            now,
            TraceStep::JdParsing,
            "Parsed job description",
            &requirements,
        );
        Ok(Some(&*self.job.insert(requirements)))
    }

    /// Populates the template and saves it to `output`.
    pub fn generate_presentation(&mut self, output: &Path) -> Result<PopulationOutcome, PipelineError> {
        info!("generating presentation");
        let empty_cv;
        let cv = match &self.cv {
            Some(cv) => cv,
            None => {
                empty_cv = CvDocument::extract(
                    &self.inputs.cv,
                    CvSource::empty(),
                    self.clock.now(),
                );
                &empty_cv
            }
        };
        let empty_rules;
        let rules = match &self.rules {
            Some(rules) => rules,
            None => {
                empty_rules =
                    RuleTable::from_rows(&self.inputs.instructions, Vec::new(), self.clock.now());
                &empty_rules
            }
        };

        let generation = |err: DocumentError| PipelineError::stage(TraceStep::PptGeneration, err);
        let mut document = self
            .collaborators
            .decks
            .open(&self.inputs.template)
            .map_err(generation)?;
        let outcome = self
            .engine
            .populate(document.as_mut(), cv, rules, self.job.as_ref())
            .map_err(generation)?;
        document.save(output).map_err(generation)?;

        info!(path = %output.display(), "presentation generated");
        self.trace.record(
            self.clock.now(),
            TraceStep::PptGeneration,
            "Generated PowerPoint",
            &json!({
                "output_path": output.display().to_string(),
                "fields": outcome.fields,
            }),
        );
        Ok(outcome)
    }

    pub fn generate_traceability_report(
        &self,
        output: &Path,
    ) -> Result<TraceabilityReport, PipelineError> {
        info!("generating traceability report");
        let inputs = ReportInputs {
            cv: self.inputs.cv.clone(),
            instructions: self.inputs.instructions.clone(),
            template: self.inputs.template.clone(),
            job_description: self.inputs.job_description.clone(),
        };
        let counts = RunCounts {
            cv_sections_extracted: self.cv.as_ref().map_or(0, |cv| cv.sections().len()),
            instruction_rules: self.rules.as_ref().map_or(0, RuleTable::len),
        };

        let report = TraceabilityReport::build(self.clock.now(), inputs, &self.trace, counts);
        report.write(output)?;
        Ok(report)
    }

    pub fn run(&mut self) -> Result<GeneratedArtifacts, PipelineError> {
        info!("starting CV automation workflow");
        let result = self.run_stages();
        match &result {
            Ok(artifacts) => info!(
                presentation = %artifacts.presentation.display(),
                report = %artifacts.traceability_report.display(),
                "CV automation workflow completed"
            ),
            Err(err) => error!(error = %err, "CV automation workflow failed"),
        }
        result
    }

    fn run_stages(&mut self) -> Result<GeneratedArtifacts, PipelineError> {
        self.validate_inputs()?;
        self.parse_cv()?;
        self.parse_instructions()?;
        self.parse_job_description()?;

        let stamp = self.clock.now();
        let presentation = self.inputs.presentation_path(stamp);
        let traceability_report = self.inputs.report_path(stamp);

        self.generate_presentation(&presentation)?;
        self.generate_traceability_report(&traceability_report)?;

        Ok(GeneratedArtifacts {
            presentation,
            traceability_report,
        })
    }
}

fn require_file(path: &Path, reason: &str) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        error!(path = %path.display(), "{reason}");
        Err(PipelineError::invalid_input(path, reason))
    }
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            allowed
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}
