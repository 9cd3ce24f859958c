//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use serde::{Deserialize, Serialize};

/// Runtime configuration section.
///
/// # Example
///
/// ```
/// use tessera_config::RuntimeSection;
///
/// let runtime = RuntimeSection {
///     name: "billing".to_string(),
///     dev: true,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeSection {
    /// Prefix for procedure names in logs, metrics and error shapes.
    #[serde(default = "default_runtime_name")]
    pub name: String,

    /// Development mode. Error shapes include the originating stack.
    #[serde(default)]
    pub dev: bool,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            name: default_runtime_name(),
            dev: false,
        }
    }
}

fn default_runtime_name() -> String {
    "tessera".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives (e.g. "info", "tessera_middleware=trace").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Record procedure metrics.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_defaults() {
        let runtime = RuntimeSection::default();
        assert_eq!(runtime.name, "tessera");
        assert!(!runtime.dev);
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), r#""json""#);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let logging: LoggingSection = toml::from_str(r#"level = "warn""#).unwrap();
        assert!(logging.enabled);
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<MetricsSection, _> = toml::from_str("enabled = true\naddr = \"0.0.0.0:9090\"");
        assert!(result.is_err());
    }
}
