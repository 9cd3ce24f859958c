//! Chain executor.
//!
//! This module turns an ordered list of [`Step`]s into one callable. The
//! chain is walked by index: step `i` receives a [`Next`] that dispatches
//! step `i + 1` with the `(ctx, input)` pair step `i` chose. Every
//! invocation carries its own cursor, so a single executor can be called
//! concurrently any number of times.
//!
//! ## Step boundary
//!
//! Whatever a step raises is caught where it was raised:
//!
//! | Step result | Chain result |
//! |-------------|--------------|
//! | `Ok(outcome)` | `outcome`, unchanged |
//! | `Err(thrown)` | failed outcome with the normalized error |
//! | panic | failed outcome with the normalized panic message |
//! | `Err(Thrown::Configuration(_))` | `Err(ConfigurationError)` |
//!
//! Advancing past the last step means no resolver was attached. That is a
//! malformed pipeline and the only way `execute` returns `Err`.

use crate::definition::{Definition, ANONYMOUS};
use crate::middleware::{BoxFuture, Next};
use crate::step::{Step, StepKind};
use futures_util::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tessera_core::{normalize, CallOptions, ConfigurationError, Outcome, ProcedureError, Thrown};
use tessera_telemetry::metrics::record_step_failure;

/// The immutable step list shared by every invocation.
pub(crate) struct Chain {
    name: Arc<str>,
    steps: Vec<Step>,
}

impl Chain {
    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Runs the step at `index`, and through its `next`, every step after it.
    pub(crate) fn dispatch(
        self: Arc<Self>,
        index: usize,
        opts: CallOptions,
    ) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        Box::pin(async move {
            let Some(step) = self.steps.get(index) else {
                let error = ConfigurationError::MissingResolver {
                    index,
                    len: self.steps.len(),
                };
                tracing::error!(procedure = %self.name, error = %error, "Step chain is malformed");
                return Err(error);
            };

            let kind = step.kind();
            tracing::trace!(
                step = kind.as_str(),
                step_index = index,
                name = step.name(),
                "Entering step"
            );

            let next = Next::new(Arc::clone(&self), index + 1, opts.clone());
            let CallOptions { ctx, input } = opts;

            let result = AssertUnwindSafe(async { step.invoke(ctx, input, next).await })
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(outcome)) => Ok(outcome),
                Ok(Err(Thrown::Configuration(error))) => Err(error),
                Ok(Err(thrown)) => Ok(Outcome::Failure(self.fail(index, kind, normalize(thrown)))),
                Err(payload) => {
                    let error = normalize(Thrown::from_panic(payload));
                    tracing::warn!(
                        step = kind.as_str(),
                        step_index = index,
                        error = %error,
                        "Step panicked"
                    );
                    Ok(Outcome::Failure(self.fail(index, kind, error)))
                }
            }
        })
    }

    fn fail(&self, index: usize, kind: StepKind, error: ProcedureError) -> ProcedureError {
        tracing::debug!(
            step = kind.as_str(),
            step_index = index,
            error_code = %error.code(),
            error = %error,
            "Step failed"
        );
        record_step_failure(&self.name, kind.as_str(), error.code());
        error
    }
}

/// Runs an ordered list of steps as one callable.
///
/// Cloning is cheap; clones share the step list.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tessera_core::{schema, CallOptions, Thrown};
/// use tessera_middleware::{ChainExecutor, FnResolver, ResolveOptions, Step};
///
/// # tokio_test::block_on(async {
/// let executor = ChainExecutor::new(
///     "double",
///     vec![
///         Step::input(schema::<i64>()),
///         Step::resolver(FnResolver::new(|opts: ResolveOptions| async move {
///             let n: i64 = opts.input_as()?;
///             Ok::<_, Thrown>(n * 2)
///         })),
///     ],
/// );
///
/// let outcome = executor.execute(CallOptions::new(json!({}), 21)).await.unwrap();
/// assert_eq!(outcome.data(), Some(&json!(42)));
/// # });
/// ```
#[derive(Clone)]
pub struct ChainExecutor {
    chain: Arc<Chain>,
}

impl ChainExecutor {
    /// Creates an executor over `steps`.
    ///
    /// The list is not checked for a resolver; running off its end surfaces
    /// as a [`ConfigurationError`] when executed.
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        let name: String = name.into();
        Self {
            chain: Arc::new(Chain {
                name: Arc::from(name),
                steps,
            }),
        }
    }

    /// Creates an executor over the steps of a definition.
    #[must_use]
    pub fn from_definition(def: &Definition) -> Self {
        Self::new(def.name().unwrap_or(ANONYMOUS), def.steps().to_vec())
    }

    /// Runs the chain from its first step.
    pub fn execute(&self, opts: CallOptions) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        Arc::clone(&self.chain).dispatch(0, opts)
    }

    /// Returns the name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.chain.name
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.steps.is_empty()
    }

    /// Returns the kinds of all steps in order.
    #[must_use]
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.chain.steps.iter().map(Step::kind).collect()
    }
}

impl fmt::Debug for ChainExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainExecutor")
            .field("name", &self.chain.name)
            .field("steps", &self.chain.steps)
            .finish()
    }
}
