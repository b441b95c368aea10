mod cli;

use cv_deck::error::PipelineError;
use cv_deck::slides::GeneratedArtifacts;

pub fn run() -> Result<GeneratedArtifacts, PipelineError> {
    cli::run()
}
