use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a deck generation run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub trace: TraceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("CV_DECK_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("CV_DECK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_file =
            env::var("CV_DECK_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        if log_file.trim().is_empty() {
            return Err(ConfigError::EmptyLogFile);
        }

        let summary_limit = match env::var("CV_DECK_SUMMARY_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidSummaryLimit { value: raw })?,
            Err(_) => DEFAULT_SUMMARY_LIMIT,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                log_file,
            },
            trace: TraceConfig { summary_limit },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                log_file: DEFAULT_LOG_FILE.to_string(),
            },
            trace: TraceConfig::default(),
        }
    }
}

pub const DEFAULT_LOG_FILE: &str = "cv_automation.log";
pub const DEFAULT_SUMMARY_LIMIT: usize = 500;

/// Tracing controls. The log file is created inside the run's output directory.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_file: String,
}

/// Traceability log settings.
#[derive(Debug, Clone, Copy)]
pub struct TraceConfig {
    /// Maximum number of characters kept in a trace entry's data summary.
    pub summary_limit: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            summary_limit: DEFAULT_SUMMARY_LIMIT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyLogFile,
    InvalidSummaryLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyLogFile => write!(f, "CV_DECK_LOG_FILE must not be empty"),
            ConfigError::InvalidSummaryLimit { value } => write!(
                f,
                "CV_DECK_SUMMARY_LIMIT must be a positive integer (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("CV_DECK_ENV");
        env::remove_var("CV_DECK_LOG_LEVEL");
        env::remove_var("CV_DECK_LOG_FILE");
        env::remove_var("CV_DECK_SUMMARY_LIMIT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_file, "cv_automation.log");
        assert_eq!(config.trace.summary_limit, 500);
    }

    #[test]
    fn rejects_zero_summary_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CV_DECK_SUMMARY_LIMIT", "0");
        let error = AppConfig::load().expect_err("zero limit rejected");
        assert!(matches!(error, ConfigError::InvalidSummaryLimit { .. }));
        reset_env();
    }

    #[test]
    fn reads_environment_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CV_DECK_ENV", "ci");
        env::set_var("CV_DECK_LOG_LEVEL", "debug");
        env::set_var("CV_DECK_SUMMARY_LIMIT", "120");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.trace.summary_limit, 120);
        reset_env();
    }
}
