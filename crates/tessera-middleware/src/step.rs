//! Pipeline steps.
//!
//! A pipeline is an ordered list of [`Step`]s. Each variant carries the data
//! its role needs and is dispatched explicitly by the executor.

use crate::middleware::{BoxFuture, Middleware, Next, StepResult};
use crate::stages::resolve::Resolver;
use crate::stages::validation::{InputParser, OutputParser};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tessera_core::{Outcome, Parser};

/// The role of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Parses the input before the steps after it run.
    Input,
    /// Parses the data the steps after it produced.
    Output,
    /// Terminal step producing the success payload.
    Resolver,
    /// Arbitrary user middleware.
    User,
}

impl StepKind {
    /// Returns the label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::Resolver => "resolver",
            Self::User => "middleware",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of a pipeline.
#[derive(Clone)]
pub enum Step {
    /// Input parser adapter.
    Input(InputParser),
    /// Output parser adapter.
    Output(OutputParser),
    /// Terminal resolver.
    Resolver(Arc<dyn Resolver>),
    /// User middleware.
    User(Arc<dyn Middleware>),
}

impl Step {
    /// Creates an input step from a parser.
    pub fn input(parser: impl Parser) -> Self {
        Self::Input(InputParser::new(Arc::new(parser)))
    }

    /// Creates an output step from a parser.
    pub fn output(parser: impl Parser) -> Self {
        Self::Output(OutputParser::new(Arc::new(parser)))
    }

    /// Creates a resolver step.
    pub fn resolver(resolver: impl Resolver) -> Self {
        Self::Resolver(Arc::new(resolver))
    }

    /// Creates a user middleware step.
    pub fn user(middleware: impl Middleware) -> Self {
        Self::User(Arc::new(middleware))
    }

    /// Returns the role of this step.
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::Input(_) => StepKind::Input,
            Self::Output(_) => StepKind::Output,
            Self::Resolver(_) => StepKind::Resolver,
            Self::User(_) => StepKind::User,
        }
    }

    /// Returns the name of the underlying parser, resolver or middleware.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input(adapter) => adapter.parser().name(),
            Self::Output(adapter) => adapter.parser().name(),
            Self::Resolver(resolver) => resolver.name(),
            Self::User(middleware) => middleware.name(),
        }
    }

    pub(crate) fn invoke(&self, ctx: Value, input: Value, next: Next) -> BoxFuture<'_, StepResult> {
        match self {
            Self::Input(adapter) => adapter.process(ctx, input, next),
            Self::Output(adapter) => adapter.process(ctx, input, next),
            Self::Resolver(resolver) => {
                // resolvers are terminal
                drop(next);
                Box::pin(async move {
                    let data = resolver.resolve(ctx, input).await?;
                    Ok(Outcome::Success(data))
                })
            }
            Self::User(middleware) => middleware.process(ctx, input, next),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}
