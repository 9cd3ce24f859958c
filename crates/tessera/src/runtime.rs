//! The root factory services build procedures from.
//!
//! A [`Runtime`] carries what every procedure of a service shares: a name
//! prefix, the development flag and the error formatter applied when an
//! outcome leaves the process.

use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tessera_config::TesseraConfig;
use tessera_core::{CallOptions, ConfigurationError, ErrorShape, Outcome, ProcedureError};
use tessera_middleware::{create_builder, Definition, Procedure, ProcedureBuilder};

/// Runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Prefix for procedure names. `None` leaves names as given.
    pub name: Option<String>,
    /// Development mode. Formatted errors carry the originating stack.
    pub is_dev: bool,
}

impl RuntimeConfig {
    /// Creates a config with the given name prefix.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets development mode.
    #[must_use]
    pub fn dev(mut self, is_dev: bool) -> Self {
        self.is_dev = is_dev;
        self
    }
}

impl From<&TesseraConfig> for RuntimeConfig {
    fn from(config: &TesseraConfig) -> Self {
        Self {
            name: Some(config.runtime.name.clone()),
            is_dev: config.runtime.dev,
        }
    }
}

/// Everything an [`ErrorFormatter`] can look at.
#[derive(Debug)]
pub struct FormatContext<'a> {
    /// The error being formatted.
    pub error: &'a ProcedureError,
    /// The default shape of `error`.
    pub shape: ErrorShape,
    /// The context of the failed call, if known.
    pub ctx: Option<&'a Value>,
    /// The input of the failed call, if known.
    pub input: Option<&'a Value>,
    /// The procedure name, if known.
    pub path: Option<&'a str>,
}

/// Turns a failed call into the value sent to callers.
pub trait ErrorFormatter: Send + Sync + 'static {
    /// Formats one error.
    fn format(&self, cx: FormatContext<'_>) -> Value;
}

impl<F> ErrorFormatter for F
where
    F: Fn(FormatContext<'_>) -> Value + Send + Sync + 'static,
{
    fn format(&self, cx: FormatContext<'_>) -> Value {
        self(cx)
    }
}

/// Returns the default shape unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorFormatter;

impl ErrorFormatter for DefaultErrorFormatter {
    fn format(&self, cx: FormatContext<'_>) -> Value {
        serde_json::to_value(&cx.shape).unwrap_or_default()
    }
}

/// Root factory for procedures.
///
/// Cloning is cheap; clones share the config and the formatter.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tessera::prelude::*;
///
/// # tokio_test::block_on(async {
/// let runtime = Runtime::new(RuntimeConfig::named("billing"));
///
/// let total = runtime
///     .procedure_named("invoice.total")
///     .input(schema::<Vec<u64>>())
///     .resolve(|opts: ResolveOptions| async move {
///         let lines: Vec<u64> = opts.input_as()?;
///         Ok::<_, Thrown>(lines.iter().sum::<u64>())
///     });
///
/// assert_eq!(total.name(), "billing.invoice.total");
///
/// let reply = runtime.call(&total, CallOptions::new(json!({}), json!([2, 3]))).await.unwrap();
/// assert_eq!(reply, json!({ "ok": true, "data": 5 }));
/// # });
/// ```
#[derive(Clone)]
pub struct Runtime {
    config: Arc<RuntimeConfig>,
    formatter: Arc<dyn ErrorFormatter>,
}

impl Runtime {
    /// Creates a runtime with the default error formatter.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config: Arc::new(config),
            formatter: Arc::new(DefaultErrorFormatter),
        }
    }

    /// Creates a runtime from loaded configuration.
    #[must_use]
    pub fn from_config(config: &TesseraConfig) -> Self {
        Self::new(RuntimeConfig::from(config))
    }

    /// Replaces the error formatter.
    #[must_use]
    pub fn with_error_formatter(mut self, formatter: impl ErrorFormatter) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Returns the runtime settings.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns `true` in development mode.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.config.is_dev
    }

    /// Returns an empty builder named after the runtime.
    #[must_use]
    pub fn procedure(&self) -> ProcedureBuilder {
        match &self.config.name {
            Some(name) => create_builder().name(name.clone()),
            None => create_builder(),
        }
    }

    /// Returns an empty builder for a procedure called `name`, prefixed with
    /// the runtime name.
    #[must_use]
    pub fn procedure_named(&self, name: &str) -> ProcedureBuilder {
        create_builder().name(self.qualify(name))
    }

    /// Returns a builder seeded from a shared definition.
    ///
    /// An unnamed definition takes the runtime name.
    pub fn procedure_from(&self, def: Definition) -> Result<ProcedureBuilder, ConfigurationError> {
        let named = def.name().is_some();
        let builder = ProcedureBuilder::from_definition(def)?;
        match &self.config.name {
            Some(name) if !named => Ok(builder.name(name.clone())),
            _ => Ok(builder),
        }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.config.name {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    /// Formats an error with the installed formatter.
    pub fn format_error(
        &self,
        error: &ProcedureError,
        path: Option<&str>,
        opts: Option<&CallOptions>,
    ) -> Value {
        let shape = error.to_shape(path, self.config.is_dev);
        self.formatter.format(FormatContext {
            error,
            shape,
            ctx: opts.map(|o| &o.ctx),
            input: opts.map(|o| &o.input),
            path,
        })
    }

    /// Formats an outcome as `{ok, data}` or `{ok: false, error}`, with the
    /// error passed through the installed formatter.
    pub fn format_outcome(
        &self,
        outcome: &Outcome,
        path: Option<&str>,
        opts: Option<&CallOptions>,
    ) -> Value {
        match outcome {
            Outcome::Success(data) => json!({ "ok": true, "data": data }),
            Outcome::Failure(error) => json!({
                "ok": false,
                "error": self.format_error(error, path, opts),
            }),
        }
    }

    /// Calls a procedure and formats its outcome.
    pub async fn call(
        &self,
        procedure: &Procedure,
        opts: CallOptions,
    ) -> Result<Value, ConfigurationError> {
        let outcome = procedure.call(opts.clone()).await?;
        Ok(self.format_outcome(&outcome, Some(procedure.name()), Some(&opts)))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
