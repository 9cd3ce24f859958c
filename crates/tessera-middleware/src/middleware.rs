//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that user steps implement,
//! and [`Next`], the single-advance continuation every step receives.
//!
//! A step sees the `(ctx, input)` pair the chain has accumulated so far. It
//! either continues by consuming `next` (optionally replacing the context or
//! the input for the steps after it), or short-circuits by returning its own
//! [`Outcome`] without touching `next`.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use tessera_middleware::{BoxFuture, Middleware, Next, StepResult};
//!
//! struct Tenant;
//!
//! impl Middleware for Tenant {
//!     fn name(&self) -> &'static str {
//!         "tenant"
//!     }
//!
//!     fn process<'a>(&'a self, ctx: Value, _input: Value, next: Next) -> BoxFuture<'a, StepResult> {
//!         Box::pin(async move {
//!             let mut ctx = ctx;
//!             ctx["tenant"] = json!("acme");
//!             Ok(next.with_ctx(ctx).await?)
//!         })
//!     }
//! }
//! ```

use crate::chain::Chain;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tessera_core::{CallOptions, ConfigurationError, Outcome, Overrides, Thrown};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a step returns. `Err` is how a step throws.
pub type StepResult = Result<Outcome, Thrown>;

/// A user step in the pipeline.
///
/// # Invariants
///
/// - A step runs at most once per traversal of the chain
/// - `next` is consumed on use, so a step can advance at most once
/// - A step only affects the `(ctx, input)` seen by steps after it
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this step.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Runs the step.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The context as seen by this step
    /// * `input` - The input as seen by this step
    /// * `next` - Continuation to the following step
    fn process<'a>(&'a self, ctx: Value, input: Value, next: Next) -> BoxFuture<'a, StepResult>;
}

/// Continuation to the next step of the chain.
///
/// Consumed by value, so it can only be advanced once. Dropping it
/// short-circuits the chain: no later step runs.
///
/// Overrides replace, they never merge. A step that wants to add a key to
/// the context must pass the full, already merged object.
pub struct Next {
    chain: Arc<Chain>,
    index: usize,
    opts: CallOptions,
}

impl Next {
    pub(crate) fn new(chain: Arc<Chain>, index: usize, opts: CallOptions) -> Self {
        Self { chain, index, opts }
    }

    /// Advances with the current context and input unchanged.
    pub fn run(self) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        self.with(Overrides::none())
    }

    /// Advances with the context replaced by `ctx`.
    pub fn with_ctx(self, ctx: impl Into<Value>) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        self.with(Overrides::none().ctx(ctx))
    }

    /// Advances with the input replaced by `input`.
    pub fn with_input(
        self,
        input: impl Into<Value>,
    ) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        self.with(Overrides::none().input(input))
    }

    /// Advances with the given overrides applied.
    pub fn with(self, overrides: Overrides) -> BoxFuture<'static, Result<Outcome, ConfigurationError>> {
        let opts = self.opts.apply(overrides);
        self.chain.dispatch(self.index, opts)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// Arguments handed to a [`FnMiddleware`] closure.
#[derive(Debug)]
pub struct MiddlewareOptions {
    /// The context as seen by this step.
    pub ctx: Value,
    /// The input as seen by this step.
    pub input: Value,
    /// Continuation to the following step.
    pub next: Next,
}

/// A middleware that can be created from an async function.
///
/// # Example
///
/// ```
/// use tessera_middleware::{FnMiddleware, MiddlewareOptions, StepResult};
///
/// let passthrough = FnMiddleware::new("passthrough", |opts: MiddlewareOptions| async move {
///     StepResult::Ok(opts.next.run().await?)
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new<Fut>(name: &'static str, func: F) -> Self
    where
        F: Fn(MiddlewareOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        Self { name, func }
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(MiddlewareOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StepResult> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, ctx: Value, input: Value, next: Next) -> BoxFuture<'a, StepResult> {
        Box::pin((self.func)(MiddlewareOptions { ctx, input, next }))
    }
}
