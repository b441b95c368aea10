use cv_deck_cli::run;

fn main() {
    match run() {
        Ok(artifacts) => {
            println!("PowerPoint: {}", artifacts.presentation.display());
            println!("Traceability Report: {}", artifacts.traceability_report.display());
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    }
}
