//! Terminal resolver step.
//!
//! A resolver ignores the continuation entirely: it computes the success
//! payload from the `(ctx, input)` the chain accumulated and ends the
//! traversal. Whatever it raises becomes a failed outcome.

use crate::middleware::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use tessera_core::{ProcedureError, Thrown};

/// The terminal step of a procedure.
pub trait Resolver: Send + Sync + 'static {
    /// Computes the success payload.
    fn resolve<'a>(&'a self, ctx: Value, input: Value) -> BoxFuture<'a, Result<Value, Thrown>>;

    /// Returns a name for logging.
    fn name(&self) -> &'static str {
        "resolver"
    }
}

/// Arguments handed to a [`FnResolver`] closure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    /// The context as accumulated by the chain.
    pub ctx: Value,
    /// The input as accumulated by the chain.
    pub input: Value,
}

impl ResolveOptions {
    /// Deserializes the context.
    ///
    /// A context that does not match `T` is a server-side fault and is
    /// reported as an internal error.
    pub fn ctx_as<T: DeserializeOwned>(&self) -> Result<T, Thrown> {
        T::deserialize(&self.ctx).map_err(|e| {
            Thrown::Error(ProcedureError::internal(format!("unexpected context shape: {e}")))
        })
    }

    /// Deserializes the input.
    ///
    /// Declare an input parser first if the input must be validated; this
    /// only reshapes it.
    pub fn input_as<T: DeserializeOwned>(&self) -> Result<T, Thrown> {
        T::deserialize(&self.input).map_err(|e| {
            Thrown::Error(ProcedureError::bad_request(format!("unexpected input shape: {e}")))
        })
    }
}

/// A resolver backed by an async closure.
///
/// The closure may return any serializable value.
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use tessera_core::Thrown;
/// use tessera_middleware::{FnResolver, ResolveOptions};
///
/// let double = FnResolver::new(|opts: ResolveOptions| async move {
///     let n: i64 = opts.input_as()?;
///     Ok::<_, Thrown>(n * 2)
/// });
/// ```
pub struct FnResolver<F> {
    func: F,
}

impl<F> FnResolver<F> {
    /// Creates a resolver from a closure.
    pub fn new<Fut, R>(func: F) -> Self
    where
        F: Fn(ResolveOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
        R: Serialize + 'static,
    {
        Self { func }
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

impl<F, Fut, R> Resolver for FnResolver<F>
where
    F: Fn(ResolveOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
    R: Serialize + 'static,
{
    fn resolve<'a>(&'a self, ctx: Value, input: Value) -> BoxFuture<'a, Result<Value, Thrown>> {
        let fut = (self.func)(ResolveOptions { ctx, input });
        Box::pin(async move {
            let data = fut.await?;
            Ok(serde_json::to_value(data)?)
        })
    }
}
