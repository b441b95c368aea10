use crate::config::TelemetryConfig;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter};

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    LogFile { path: PathBuf, source: std::io::Error },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::LogFile { path, source } => {
                write!(f, "unable to open log file {}: {}", path.display(), source)
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::LogFile { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Installs the process-wide subscriber: compact console output plus a plain
/// log file inside `output_dir`. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init(config: &TelemetryConfig, output_dir: &Path) -> Result<PathBuf, TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            })?
        }
    };

    let log_path = output_dir.join(&config.log_file);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|source| TelemetryError::LogFile {
            path: log_path.clone(),
            source,
        })?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt_layer::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stdout),
        )
        .with(
            fmt_layer::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .map_err(|err| TelemetryError::Subscriber(Box::new(err)))?;

    Ok(log_path)
}
