//! Prometheus metrics for Tessera.
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
//! Recording works whether or not [`init_metrics`] was called; without an
//! installed recorder the `metrics` facade discards the values.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_telemetry::metrics::{record_call, CallStatus};
//!
//! record_call("widget.get", CallStatus::Ok, Duration::from_millis(3));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tessera_core::ErrorCode;

/// Completed calls counter.
pub const CALLS_TOTAL: &str = "tessera_procedure_calls_total";
/// Call duration histogram.
pub const CALL_DURATION: &str = "tessera_procedure_duration_seconds";
/// In-flight calls gauge.
pub const IN_FLIGHT: &str = "tessera_procedure_in_flight";
/// Failed steps counter.
pub const STEP_FAILURES_TOTAL: &str = "tessera_step_failures_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for call duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 100us to 5s
            duration_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
            ],
        }
    }
}

/// How a top-level call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The call produced a successful outcome.
    Ok,
    /// The call produced a failed outcome.
    Error,
    /// The pipeline was malformed.
    Misconfigured,
}

impl CallStatus {
    /// Returns the metric label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Misconfigured => "misconfigured",
        }
    }
}

/// Installs the in-process Prometheus recorder.
///
/// No HTTP listener is started; use [`render_metrics`] to obtain the text
/// exposition and serve it however the embedding service does.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(CALL_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(CALLS_TOTAL, "Total number of procedure calls by outcome");
    describe_histogram!(CALL_DURATION, "Procedure call duration in seconds");
    describe_gauge!(IN_FLIGHT, "Number of procedure calls currently running");
    describe_counter!(STEP_FAILURES_TOTAL, "Total failed steps by kind and error code");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Records a completed top-level call.
pub fn record_call(procedure: &str, status: CallStatus, duration: Duration) {
    counter!(
        CALLS_TOTAL,
        "procedure" => procedure.to_string(),
        "outcome" => status.as_str()
    )
    .increment(1);

    histogram!(CALL_DURATION, "procedure" => procedure.to_string()).record(duration.as_secs_f64());
}

/// Records a step that produced a failed outcome.
pub fn record_step_failure(procedure: &str, step: &'static str, code: ErrorCode) {
    counter!(
        STEP_FAILURES_TOTAL,
        "procedure" => procedure.to_string(),
        "step" => step,
        "code" => code.key()
    )
    .increment(1);
}

/// Guard that tracks an in-flight call.
///
/// Increments the gauge on creation and decrements it on drop, so the
/// gauge stays correct when the calling future is cancelled.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}
