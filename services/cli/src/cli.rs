use std::path::PathBuf;

use clap::Parser;
use cv_deck::config::AppConfig;
use cv_deck::error::PipelineError;
use cv_deck::pipeline::{CvAutomation, RunInputs};
use cv_deck::slides::GeneratedArtifacts;
use cv_deck::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "cv-automation",
    about = "Automate PowerPoint slide creation from CV data",
    after_help = "Examples:\n  cv-automation --cv resume.txt --instructions rules.xlsx --template template.pptx\n  cv-automation --cv resume.txt --instructions rules.xlsx --template template.pptx --job-description jd.txt --output-dir ./output",
    version
)]
pub(crate) struct Cli {
    /// Path to the CV file (PDF, DOCX, or TXT)
    #[arg(long)]
    pub(crate) cv: PathBuf,
    /// Path to the Excel instruction workbook
    #[arg(long)]
    pub(crate) instructions: PathBuf,
    /// Path to the PowerPoint template
    #[arg(long)]
    pub(crate) template: PathBuf,
    /// Optional path to a plain-text job description
    #[arg(long)]
    pub(crate) job_description: Option<PathBuf>,
    /// Output directory for generated files (default: current directory)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Cli {
    pub(crate) fn resolved_output_dir(&self) -> Result<PathBuf, PipelineError> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub(crate) fn run_inputs(&self, output_dir: PathBuf) -> RunInputs {
        RunInputs {
            cv: self.cv.clone(),
            instructions: self.instructions.clone(),
            template: self.template.clone(),
            job_description: self.job_description.clone(),
            output_dir,
        }
    }
}

pub(crate) fn run() -> Result<GeneratedArtifacts, PipelineError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.telemetry.log_level = "debug".to_string();
    }

    let output_dir = cli.resolved_output_dir()?;
    std::fs::create_dir_all(&output_dir)?;
    let log_file = telemetry::init(&config.telemetry, &output_dir)?;
    info!(?config.environment, log_file = %log_file.display(), "cv automation starting");

    execute(&cli, &config, output_dir)
}

/// Runs the pipeline for already-parsed arguments. Telemetry is the caller's job.
pub(crate) fn execute(
    cli: &Cli,
    config: &AppConfig,
    output_dir: PathBuf,
) -> Result<GeneratedArtifacts, PipelineError> {
    let mut automation = CvAutomation::from_config(cli.run_inputs(output_dir), config);
    automation.run()
}
