//! Input and output parser adapters.
//!
//! These adapters turn a [`Parser`] into pipeline steps.
//!
//! # Pipeline Position
//!
//! An input step runs where it was declared and validates the input every
//! later step sees:
//!
//! ```text
//! ... → [InputParser] → ... → Resolver
//! ```
//!
//! An output step lets the rest of the chain run first, then validates the
//! data it produced on the way back:
//!
//! ```text
//! ... → [OutputParser] → ... → Resolver
//!             ↑__________________↓
//! ```
//!
//! # Failures
//!
//! A failing input parser short-circuits the chain with a `BAD_REQUEST`
//! error; the resolver never runs. A failing output parser turns the
//! success into an `INTERNAL_SERVER_ERROR`. A failure produced downstream of
//! an output step passes through it unchanged.

use crate::middleware::{BoxFuture, Middleware, Next, StepResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tessera_core::{normalize_as, ErrorCode, Outcome, Parser, Thrown};

/// Step that parses the input and continues with the parsed value.
#[derive(Clone)]
pub struct InputParser {
    parser: Arc<dyn Parser>,
}

impl InputParser {
    /// Wraps a parser.
    #[must_use]
    pub fn new(parser: Arc<dyn Parser>) -> Self {
        Self { parser }
    }

    /// Returns the wrapped parser.
    #[must_use]
    pub fn parser(&self) -> &Arc<dyn Parser> {
        &self.parser
    }
}

impl fmt::Debug for InputParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputParser")
            .field("parser", &self.parser.name())
            .finish()
    }
}

impl Middleware for InputParser {
    fn name(&self) -> &'static str {
        "input_parser"
    }

    fn process<'a>(&'a self, _ctx: Value, input: Value, next: Next) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            match self.parser.parse(input) {
                Ok(parsed) => Ok(next.with_input(parsed).await?),
                Err(thrown) => Err(reclassify(thrown, ErrorCode::BadRequest)),
            }
        })
    }
}

/// Step that validates the data produced by the steps after it.
#[derive(Clone)]
pub struct OutputParser {
    parser: Arc<dyn Parser>,
}

impl OutputParser {
    /// Wraps a parser.
    #[must_use]
    pub fn new(parser: Arc<dyn Parser>) -> Self {
        Self { parser }
    }

    /// Returns the wrapped parser.
    #[must_use]
    pub fn parser(&self) -> &Arc<dyn Parser> {
        &self.parser
    }
}

impl fmt::Debug for OutputParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputParser")
            .field("parser", &self.parser.name())
            .finish()
    }
}

impl Middleware for OutputParser {
    fn name(&self) -> &'static str {
        "output_parser"
    }

    fn process<'a>(&'a self, _ctx: Value, _input: Value, next: Next) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            match next.run().await? {
                Outcome::Success(data) => match self.parser.parse(data) {
                    Ok(parsed) => Ok(Outcome::Success(parsed)),
                    Err(thrown) => Err(reclassify(thrown, ErrorCode::InternalServerError)),
                },
                failure @ Outcome::Failure(_) => Ok(failure),
            }
        })
    }
}

fn reclassify(thrown: Thrown, code: ErrorCode) -> Thrown {
    if thrown.is_configuration() {
        return thrown;
    }
    Thrown::Error(normalize_as(thrown, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainExecutor;
    use crate::stages::resolve::{FnResolver, ResolveOptions};
    use crate::step::Step;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tessera_core::{parser_fn, schema, CallOptions, ProcedureError};

    fn echo_input() -> Step {
        Step::resolver(FnResolver::new(|opts: ResolveOptions| async move {
            Ok::<_, Thrown>(opts.input)
        }))
    }

    #[tokio::test]
    async fn test_input_parser_substitutes_parsed_value() {
        let trim = parser_fn(|raw| match raw.as_str() {
            Some(s) => Ok(Value::from(s.trim())),
            None => Err("expected a string".into()),
        });
        let executor = ChainExecutor::new("trim", vec![Step::input(trim), echo_input()]);

        let outcome = executor
            .execute(CallOptions::new(Value::Null, "  padded  "))
            .await
            .unwrap();
        assert_eq!(outcome.data(), Some(&json!("padded")));
    }

    #[tokio::test]
    async fn test_input_failure_is_bad_request_and_skips_resolver() {
        static RESOLVED: AtomicUsize = AtomicUsize::new(0);

        let executor = ChainExecutor::new(
            "count",
            vec![
                Step::input(schema::<i64>()),
                Step::resolver(FnResolver::new(|_opts: ResolveOptions| async move {
                    RESOLVED.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Thrown>(Value::Null)
                })),
            ],
        );

        let outcome = executor
            .execute(CallOptions::new(Value::Null, "x"))
            .await
            .unwrap();
        assert_eq!(
            outcome.error().map(ProcedureError::code),
            Some(ErrorCode::BadRequest)
        );
        assert_eq!(RESOLVED.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_output_failure_is_internal() {
        let executor = ChainExecutor::new(
            "out",
            vec![Step::output(schema::<String>()), echo_input()],
        );

        let outcome = executor
            .execute(CallOptions::new(Value::Null, 42))
            .await
            .unwrap();
        assert_eq!(
            outcome.error().map(ProcedureError::code),
            Some(ErrorCode::InternalServerError)
        );

        let outcome = executor
            .execute(CallOptions::new(Value::Null, "fine"))
            .await
            .unwrap();
        assert_eq!(outcome.data(), Some(&json!("fine")));
    }

    #[tokio::test]
    async fn test_output_passes_downstream_failure_through() {
        let executor = ChainExecutor::new(
            "passthrough",
            vec![
                Step::output(schema::<String>()),
                Step::resolver(FnResolver::new(|_opts: ResolveOptions| async move {
                    Err::<Value, _>(Thrown::from(ProcedureError::new(
                        ErrorCode::NotFound,
                        "no widget",
                    )))
                })),
            ],
        );

        let outcome = executor.execute(CallOptions::default()).await.unwrap();
        let error = outcome.error().unwrap();
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "no widget");
    }

    #[test]
    fn test_reclassify_keeps_configuration_errors() {
        let thrown = reclassify(
            Thrown::Configuration(tessera_core::ConfigurationError::AlreadyFinalized),
            ErrorCode::BadRequest,
        );
        assert!(thrown.is_configuration());
    }
}
