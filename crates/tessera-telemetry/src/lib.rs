//! Observability for Tessera procedures.
//!
//! This crate provides the logging and metrics plumbing used by the pipeline:
//!
//! - **Logging**: `tracing` subscriber bootstrap with JSON or pretty output
//! - **Metrics**: Prometheus-format metrics via the `metrics` crate
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `tessera_procedure_calls_total` | Counter | `procedure`, `outcome` | Completed calls |
//! | `tessera_procedure_duration_seconds` | Histogram | `procedure` | Call latency |
//! | `tessera_procedure_in_flight` | Gauge | - | Calls currently running |
//! | `tessera_step_failures_total` | Counter | `procedure`, `step`, `code` | Failed steps |
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::development())?;
//!
//! // later, from a diagnostics handler
//! let text = tessera_telemetry::render_metrics().unwrap_or_default();
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, CallStatus, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_disabled() {
        let config = TelemetryConfig::builder()
            .logging(LogConfig {
                enabled: false,
                ..LogConfig::default()
            })
            .without_metrics()
            .build();

        assert!(init_telemetry(&config).is_ok());
    }
}
