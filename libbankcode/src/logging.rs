//! Logging setup shared by the bankcode binaries
//!
//! All output goes to stderr so that stdout stays clean for lookup results
//! (`bankcode-lookup --format json | jq ...`).
//!
//! ```no_run
//! use libbankcode::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "debug").init();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain single-line records
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line, colored
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset, e.g. `warn` or `libbankcode=debug`
    pub level: String,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: impl Into<String>) -> Self {
        Self {
            format,
            level: level.into(),
        }
    }

    /// Read `BANKCODE_LOG_FORMAT` and `BANKCODE_LOG_LEVEL`, defaulting to text at `warn`.
    ///
    /// `verbose` forces the level to `debug` regardless of the environment.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("BANKCODE_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = if verbose {
            "debug".to_string()
        } else {
            std::env::var("BANKCODE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
        };

        Self { format, level }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber.
    ///
    /// Returns `false` if a subscriber was already installed, which happens
    /// when several tests in one process initialise logging.
    pub fn init(&self) -> bool {
        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };
        installed.is_ok()
    }
}

/// Initialise logging from the environment (see [`LoggingConfig::from_env`])
pub fn init_default() -> bool {
    LoggingConfig::from_env(false).init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_log_format_from_str_invalid() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("Invalid log format: 'yaml'"));
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Text.to_string(), "text");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("BANKCODE_LOG_FORMAT", "json");
        std::env::set_var("BANKCODE_LOG_LEVEL", "info");
        let config = LoggingConfig::from_env(false);
        let verbose = LoggingConfig::from_env(true);
        std::env::remove_var("BANKCODE_LOG_FORMAT");
        std::env::remove_var("BANKCODE_LOG_LEVEL");

        assert_eq!(config, LoggingConfig::new(LogFormat::Json, "info"));
        assert_eq!(verbose.level, "debug");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("BANKCODE_LOG_FORMAT");
        std::env::remove_var("BANKCODE_LOG_LEVEL");
        let config = LoggingConfig::from_env(false);

        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::new(LogFormat::Text, "error");
        config.init();
        assert!(!config.init());
    }
}
