use serde::Deserialize;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Result, SmokeError};

const LOG_FILE: &str = "inverse-smoke.log";
const DEFAULT_DIRECTIVE: &str = "info";

/// `[logging]` section of the smoke config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `debug` or `inverse_smoke=debug,tower_http=debug`
    pub level: Option<String>,
    /// Directory for a daily-rolling log file; stdout only when unset
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// `RUST_LOG` wins, then the configured level, then `SMOKE_LOG_LEVEL`.
    fn directive(&self, rust_log: Option<String>, smoke_level: Option<String>) -> String {
        rust_log
            .or_else(|| self.level.clone())
            .or(smoke_level)
            .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
    }

    fn filter(&self) -> EnvFilter {
        let directive = self.directive(
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
            std::env::var("SMOKE_LOG_LEVEL").ok(),
        );
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }

    fn log_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| std::env::var_os("SMOKE_LOG_DIR").map(PathBuf::from))
    }
}

/// Installs the global subscriber. When a log directory is configured the
/// returned guard flushes the file writer on drop; hold it until exit.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match config.log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| SmokeError::Config(format!("logging already initialised: {}", e)))?;

    Ok(guard)
}

/// Best-effort subscriber for tests; repeated calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(LoggingConfig::default().filter())
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_configured_level_beats_smoke_env() {
        let config = LoggingConfig {
            level: s("debug"),
            ..Default::default()
        };
        assert_eq!(config.directive(None, s("warn")), "debug");
    }

    #[test]
    fn test_smoke_env_used_without_configured_level() {
        let config = LoggingConfig::default();
        assert_eq!(config.directive(None, s("warn")), "warn");
    }

    #[test]
    fn test_falls_back_to_info() {
        assert_eq!(LoggingConfig::default().directive(None, None), "info");
    }

    #[test]
    fn test_rust_log_overrides_everything() {
        let config = LoggingConfig {
            level: s("debug"),
            ..Default::default()
        };
        assert_eq!(
            config.directive(s("tower_http=trace"), s("warn")),
            "tower_http=trace"
        );
    }

    #[test]
    fn test_logging_section_parses() {
        let config: LoggingConfig = toml::from_str("level = \"trace\"\ndir = \"logs\"").unwrap();
        assert_eq!(config.level.as_deref(), Some("trace"));
        assert_eq!(config.dir, Some(PathBuf::from("logs")));
    }
}
