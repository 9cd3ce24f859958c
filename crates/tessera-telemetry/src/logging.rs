//! Structured logging for Tessera.
//!
//! Procedures log through `tracing`. Every top-level call opens a
//! `procedure` span carrying the procedure name and an invocation id, and
//! the executor emits step events inside it:
//!
//! | Level | Event |
//! |-------|-------|
//! | `TRACE` | a step is entered |
//! | `DEBUG` | a step produced a failed outcome |
//! | `WARN` | a step panicked |
//! | `ERROR` | the pipeline is malformed |
//!
//! This module installs a subscriber that renders those events.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(procedure = "widget.get", "Serving");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directives (e.g., "info", "tessera_middleware=trace").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (enter, exit, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
        }
    }
}

/// Initializes the logging subsystem.
///
/// Installs a global `tracing` subscriber. Fails if the filter is invalid
/// or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

fn fmt_layer(config: &LogConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events(config))
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);

    if config.json_format {
        layer.json().boxed()
    } else {
        layer.pretty().boxed()
    }
}

fn span_events(config: &LogConfig) -> FmtSpan {
    if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Creates an env filter from a directive string.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Standard log field names.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Procedure name field name.
    pub const PROCEDURE: &str = "procedure";

    /// Invocation ID field name.
    pub const INVOCATION_ID: &str = "invocation_id";

    /// Step kind field name.
    pub const STEP: &str = "step";

    /// Step position field name.
    pub const STEP_INDEX: &str = "step_index";

    /// Error code field name.
    pub const ERROR_CODE: &str = "error_code";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = LogConfig::default();
        assert_eq!(config, LogConfig::production());
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::PROCEDURE, "procedure");
        assert_eq!(fields::INVOCATION_ID, "invocation_id");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("tessera_middleware=trace,warn").is_ok());
        assert!(create_env_filter("tessera=notalevel").is_err());
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };

        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LogConfig {
            level: "tessera=notalevel".to_string(),
            ..LogConfig::development()
        };

        let result = init_logging(&config);
        assert!(matches!(
            result,
            Err(TelemetryError::LoggingInit(msg)) if msg.contains("Invalid log level")
        ));
    }

    #[test]
    fn test_second_subscriber_is_rejected() {
        let config = LogConfig::production();

        // The first install may already have happened elsewhere in this binary.
        let _ = init_logging(&config);
        let result = init_logging(&config);
        assert!(matches!(result, Err(TelemetryError::LoggingInit(_))));

        tracing::info!(procedure = "widget.get", "logging installed");
    }

    #[test]
    fn test_span_events_follow_config() {
        assert_eq!(span_events(&LogConfig::development()), FmtSpan::NEW | FmtSpan::CLOSE);
        assert_eq!(span_events(&LogConfig::production()), FmtSpan::NONE);
    }
}
