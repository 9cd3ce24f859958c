//! Extension wrapper.
//!
//! An extension wraps a finished procedure with an outer function. The
//! function receives the caller's `(ctx, input)` and a [`Reinvoke`] handle.
//! Each use of the handle runs the *whole* wrapped procedure again from its
//! first step, with the context and input optionally replaced for that run.
//!
//! This is a different operation from [`Next`](crate::Next). `Next` advances
//! one step inside a single traversal and is consumed on use. `Reinvoke`
//! starts a fresh traversal, borrows instead of consuming, and can be used
//! any number of times, sequentially or concurrently:
//!
//! ```
//! use serde_json::{json, Value};
//! use tessera_core::{schema, CallError, CallOptions, Thrown};
//! use tessera_middleware::{create_builder, ResolveOptions};
//!
//! # tokio_test::block_on(async {
//! let square = create_builder()
//!     .input(schema::<i64>())
//!     .resolve(|opts: ResolveOptions| async move {
//!         let n: i64 = opts.input_as()?;
//!         Ok::<_, Thrown>(n * n)
//!     });
//!
//! let neighbours = square.extend(|opts| async move {
//!     let n = opts.input.as_i64().unwrap_or_default();
//!     let (below, here, above) = tokio::join!(
//!         opts.next.with_input(n - 1),
//!         opts.next.run(),
//!         opts.next.with_input(n + 1),
//!     );
//!     Ok::<_, CallError>(vec![below?, here?, above?])
//! });
//!
//! let squares = neighbours.call(CallOptions::new(Value::Null, 3)).await.unwrap();
//! assert_eq!(squares, vec![json!(4), json!(9), json!(16)]);
//! # });
//! ```
//!
//! The outer function's return value is the extended procedure's result as
//! is. It is not wrapped in an [`Outcome`](tessera_core::Outcome), and an
//! error it returns reaches the caller unchanged.

use crate::definition::Definition;
use crate::middleware::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tessera_core::{CallOptions, Overrides};

/// Something that can be run as a whole with a set of call options.
///
/// Implemented by [`Procedure`](crate::Procedure), whose output is the
/// unwrapped success data, and by [`ExtendedProcedure`], whose output is
/// whatever its extension function returns.
pub trait Invoke: Send + Sync + 'static {
    /// The result of one run.
    type Output: Send + 'static;

    /// Runs the whole callable once.
    fn invoke(&self, opts: CallOptions) -> BoxFuture<'static, Self::Output>;

    /// Returns the definition of the innermost procedure.
    fn definition(&self) -> &Definition;
}

/// Re-entrant handle to a wrapped callable.
///
/// Every method starts a complete, independent run. Omitted overrides fall
/// back to the `ctx` and `input` the extension itself was called with.
pub struct Reinvoke<P> {
    inner: Arc<P>,
    opts: CallOptions,
}

impl<P: Invoke> Reinvoke<P> {
    fn new(inner: Arc<P>, opts: CallOptions) -> Self {
        Self { inner, opts }
    }

    /// Runs the wrapped callable with the outer context and input.
    pub fn run(&self) -> BoxFuture<'static, P::Output> {
        self.with(Overrides::none())
    }

    /// Runs the wrapped callable with the context replaced by `ctx`.
    pub fn with_ctx(&self, ctx: impl Into<Value>) -> BoxFuture<'static, P::Output> {
        self.with(Overrides::none().ctx(ctx))
    }

    /// Runs the wrapped callable with the input replaced by `input`.
    pub fn with_input(&self, input: impl Into<Value>) -> BoxFuture<'static, P::Output> {
        self.with(Overrides::none().input(input))
    }

    /// Runs the wrapped callable with the given overrides applied.
    pub fn with(&self, overrides: Overrides) -> BoxFuture<'static, P::Output> {
        tracing::trace!(
            ctx_override = overrides.ctx.is_some(),
            input_override = overrides.input.is_some(),
            "Re-invoking wrapped procedure"
        );
        self.inner.invoke(self.opts.clone().apply(overrides))
    }

    /// Returns the definition of the innermost procedure.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        self.inner.definition()
    }
}

impl<P> Clone for Reinvoke<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            opts: self.opts.clone(),
        }
    }
}

impl<P> fmt::Debug for Reinvoke<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reinvoke")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

/// Arguments handed to an extension function.
#[derive(Debug)]
pub struct ExtensionOptions<P> {
    /// The context the extended procedure was called with.
    pub ctx: Value,
    /// The input the extended procedure was called with.
    pub input: Value,
    /// Handle that runs the wrapped callable again.
    pub next: Reinvoke<P>,
}

impl<P: Invoke> ExtensionOptions<P> {
    /// Returns the definition of the innermost procedure.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        self.next.definition()
    }
}

/// A callable wrapped by an extension function.
///
/// Extensions compose: an `ExtendedProcedure` can itself be extended, and
/// the outer function's `next` then runs the inner extension.
pub struct ExtendedProcedure<P, F> {
    inner: Arc<P>,
    f: Arc<F>,
}

impl<P, F, Fut> ExtendedProcedure<P, F>
where
    P: Invoke,
    F: Fn(ExtensionOptions<P>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    /// Wraps `inner` with `f`.
    pub fn new(inner: P, f: F) -> Self {
        Self {
            inner: Arc::new(inner),
            f: Arc::new(f),
        }
    }

    /// Runs the extension function once.
    pub fn call(&self, opts: CallOptions) -> BoxFuture<'static, Fut::Output> {
        self.invoke(opts)
    }

    /// Returns the definition of the innermost procedure.
    pub fn definition(&self) -> &Definition {
        self.inner.definition()
    }

    /// Wraps this extended procedure in another extension.
    pub fn extend<G, GFut>(&self, g: G) -> ExtendedProcedure<Self, G>
    where
        G: Fn(ExtensionOptions<Self>) -> GFut + Send + Sync + 'static,
        GFut: Future + Send + 'static,
        GFut::Output: Send + 'static,
    {
        ExtendedProcedure::new(self.clone(), g)
    }
}

impl<P, F, Fut> Invoke for ExtendedProcedure<P, F>
where
    P: Invoke,
    F: Fn(ExtensionOptions<P>) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    type Output = Fut::Output;

    fn invoke(&self, opts: CallOptions) -> BoxFuture<'static, Self::Output> {
        let next = Reinvoke::new(Arc::clone(&self.inner), opts.clone());
        let CallOptions { ctx, input } = opts;
        Box::pin((self.f)(ExtensionOptions { ctx, input, next }))
    }

    fn definition(&self) -> &Definition {
        self.inner.definition()
    }
}

impl<P, F> Clone for ExtendedProcedure<P, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            f: Arc::clone(&self.f),
        }
    }
}

impl<P: Invoke, F> fmt::Debug for ExtendedProcedure<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedProcedure")
            .field("definition", self.inner.definition())
            .finish_non_exhaustive()
    }
}
