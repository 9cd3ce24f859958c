//! Finalized procedures.

use crate::chain::ChainExecutor;
use crate::definition::{Definition, ANONYMOUS};
use crate::extension::{ExtendedProcedure, ExtensionOptions, Invoke};
use crate::middleware::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tessera_core::{CallError, CallOptions, ConfigurationError, Outcome};
use tessera_telemetry::metrics::{record_call, CallStatus, InFlightGuard};
use tracing::Instrument;
use uuid::Uuid;

/// A finalized pipeline.
///
/// Produced by [`ProcedureBuilder::resolve`](crate::ProcedureBuilder::resolve).
/// Cloning is cheap and clones share the definition and the step list.
/// A procedure holds no per-call state, so it can be called concurrently.
#[derive(Clone, Debug)]
pub struct Procedure {
    def: Arc<Definition>,
    executor: ChainExecutor,
}

impl Procedure {
    pub(crate) fn new(def: Definition) -> Self {
        let executor = ChainExecutor::from_definition(&def);
        Self {
            def: Arc::new(def),
            executor,
        }
    }

    /// Runs the pipeline once.
    ///
    /// Every failure raised by a step settles as [`Outcome::Failure`]. `Err`
    /// is reserved for a malformed pipeline.
    pub fn call(&self, opts: CallOptions) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        let executor = self.executor.clone();
        let span = tracing::debug_span!(
            "procedure",
            procedure = %executor.name(),
            invocation_id = %Uuid::now_v7(),
        );

        Box::pin(
            async move {
                let _in_flight = InFlightGuard::new();
                let started = Instant::now();

                let result = executor.execute(opts).await;

                let status = match &result {
                    Ok(Outcome::Success(_)) => CallStatus::Ok,
                    Ok(Outcome::Failure(_)) => CallStatus::Error,
                    Err(_) => CallStatus::Misconfigured,
                };
                let elapsed = started.elapsed();
                record_call(executor.name(), status, elapsed);
                tracing::debug!(
                    outcome = status.as_str(),
                    duration_ms = elapsed.as_secs_f64() * 1000.0,
                    "Procedure call completed"
                );

                result
            }
            .instrument(span),
        )
    }

    /// Returns the definition this procedure was built from.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.def
    }

    /// Returns the procedure name, or [`ANONYMOUS`].
    #[must_use]
    pub fn name(&self) -> &str {
        self.def.name().unwrap_or(ANONYMOUS)
    }

    /// Wraps this procedure in an extension.
    ///
    /// See [`ExtendedProcedure`].
    pub fn extend<F, Fut>(&self, f: F) -> ExtendedProcedure<Self, F>
    where
        F: Fn(ExtensionOptions<Self>) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        ExtendedProcedure::new(self.clone(), f)
    }
}

impl Invoke for Procedure {
    type Output = Result<Value, CallError>;

    fn invoke(&self, opts: CallOptions) -> BoxFuture<'static, Self::Output> {
        let call = self.call(opts);
        Box::pin(async move { Ok(call.await?.into_result()?) })
    }

    fn definition(&self) -> &Definition {
        &self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::create_builder;
    use crate::stages::resolve::ResolveOptions;
    use serde_json::json;
    use tessera_core::{schema, ErrorCode, ProcedureError, Thrown};

    fn double() -> Procedure {
        create_builder()
            .name("math.double")
            .input(schema::<i64>())
            .resolve(|opts: ResolveOptions| async move {
                let n: i64 = opts.input_as()?;
                Ok::<_, Thrown>(n * 2)
            })
    }

    #[test]
    fn test_name_defaults_to_anonymous() {
        let procedure = create_builder().resolve(|_opts: ResolveOptions| async move {
            Ok::<_, Thrown>(Value::Null)
        });
        assert_eq!(procedure.name(), ANONYMOUS);
        assert_eq!(double().name(), "math.double");
    }

    #[tokio::test]
    async fn test_call_settles_failures_as_outcomes() {
        let procedure = double();

        let ok = procedure.call(CallOptions::new(Value::Null, 4)).await.unwrap();
        assert_eq!(ok, Outcome::success(8));

        let failed = procedure.call(CallOptions::new(Value::Null, "four")).await.unwrap();
        assert_eq!(failed.error().map(ProcedureError::code), Some(ErrorCode::BadRequest));
    }

    #[tokio::test]
    async fn test_invoke_unwraps_outcome() {
        let procedure = double();

        let data = procedure.invoke(CallOptions::new(Value::Null, 5)).await.unwrap();
        assert_eq!(data, json!(10));

        let error = procedure
            .invoke(CallOptions::new(Value::Null, json!([])))
            .await
            .unwrap_err();
        assert_eq!(
            error.procedure_error().map(ProcedureError::code),
            Some(ErrorCode::BadRequest)
        );
    }

    #[tokio::test]
    async fn test_clones_share_definition() {
        let procedure = double();
        let clone = procedure.clone();
        assert!(std::ptr::eq(procedure.definition(), clone.definition()));
        assert_eq!(
            clone.call(CallOptions::new(Value::Null, 1)).await.unwrap(),
            Outcome::success(2)
        );
    }
}
