//! Main configuration types.
//!
//! This module provides the top-level [`TesseraConfig`] struct and its
//! conversions into telemetry settings.

use serde::{Deserialize, Serialize};
use tessera_telemetry::{create_env_filter, LogConfig, MetricsConfig, TelemetryConfig};

use crate::{ConfigError, LogFormat, LoggingSection, MetricsSection, RuntimeSection};

/// Complete Tessera configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use tessera_config::TesseraConfig;
///
/// let config = TesseraConfig::default();
/// assert_eq!(config.runtime.name, "tessera");
/// assert!(!config.runtime.dev);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Runtime configuration.
    #[serde(default)]
    pub runtime: RuntimeSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl TesseraConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The runtime name is empty or contains whitespace
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.runtime.name;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid_value(
                "runtime.name",
                format!("must be non-empty and contain no whitespace: {name:?}"),
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_config::{LogFormat, TesseraConfig};
    ///
    /// let config = TesseraConfig::development();
    /// assert!(config.runtime.dev);
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.runtime.dev = true;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Create a production configuration preset.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.runtime.dev = false;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }

    /// Logging settings for [`tessera_telemetry::init_logging`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            ..base
        }
    }

    /// Metrics settings for [`tessera_telemetry::init_metrics`].
    #[must_use]
    pub fn to_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.metrics.enabled,
            ..MetricsConfig::default()
        }
    }

    /// Both telemetry settings, for [`tessera_telemetry::init_telemetry`].
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.to_log_config(),
            metrics: self.to_metrics_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TesseraConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.metrics.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_presets() {
        let dev = TesseraConfig::development();
        assert!(dev.runtime.dev);
        assert_eq!(dev.logging.level, "debug");
        assert!(dev.validate().is_ok());

        let prod = TesseraConfig::production();
        assert!(!prod.runtime.dev);
        assert_eq!(prod.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut config = TesseraConfig::default();
        config.runtime.name = "my service".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("runtime.name"));

        config.runtime.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = TesseraConfig::default();
        config.logging.level = "tessera=notalevel".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        // A disabled logger is not checked
        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_log_config() {
        let log = TesseraConfig::development().to_log_config();
        assert!(!log.json_format);
        assert_eq!(log.level, "debug");

        let log = TesseraConfig::production().to_log_config();
        assert!(log.json_format);
        assert_eq!(log.level, "info");
    }

    #[test]
    fn test_to_metrics_config() {
        let mut config = TesseraConfig::default();
        config.metrics.enabled = false;

        let telemetry = config.to_telemetry_config();
        assert!(!telemetry.metrics.enabled);
        assert!(!telemetry.metrics.duration_buckets.is_empty());
    }
}
