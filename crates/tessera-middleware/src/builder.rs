//! The step composer.
//!
//! A [`ProcedureBuilder`] accumulates a [`Definition`]. Every method takes
//! `&self` and returns a new builder, so a partially built pipeline can be
//! shared as the base of many procedures:
//!
//! ```
//! use serde_json::json;
//! use tessera_core::{schema, CallOptions, Thrown};
//! use tessera_middleware::{create_builder, MiddlewareOptions, ResolveOptions, StepResult};
//!
//! # tokio_test::block_on(async {
//! let authed = create_builder().use_fn("auth", |opts: MiddlewareOptions| async move {
//!     StepResult::Ok(opts.next.run().await?)
//! });
//!
//! let get = authed.input(schema::<u32>()).resolve(|opts: ResolveOptions| async move {
//!     Ok::<_, Thrown>(json!({ "id": opts.input }))
//! });
//! let ping = authed.resolve(|_opts: ResolveOptions| async move { Ok::<_, Thrown>("pong") });
//!
//! let outcome = get.call(CallOptions::new(json!({}), 7)).await.unwrap();
//! assert_eq!(outcome.data(), Some(&json!({ "id": 7 })));
//! assert_eq!(ping.definition().steps().len(), 2);
//! # });
//! ```

use crate::definition::Definition;
use crate::middleware::{FnMiddleware, Middleware, MiddlewareOptions, StepResult};
use crate::procedure::Procedure;
use crate::stages::resolve::{FnResolver, ResolveOptions, Resolver};
use crate::step::Step;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tessera_core::{ConfigurationError, Parser, Thrown};

/// Creates an empty builder.
#[must_use]
pub fn create_builder() -> ProcedureBuilder {
    ProcedureBuilder::new()
}

/// Immutable builder of procedures.
#[derive(Clone, Debug, Default)]
pub struct ProcedureBuilder {
    def: Definition,
}

impl ProcedureBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a builder from a shared definition.
    ///
    /// Fails if the definition already has a resolver.
    pub fn from_definition(def: Definition) -> Result<Self, ConfigurationError> {
        if def.is_finalized() {
            return Err(ConfigurationError::AlreadyFinalized);
        }
        Ok(Self { def })
    }

    fn extend(&self, patch: Definition) -> Self {
        Self {
            def: self.def.merge_unchecked(patch),
        }
    }

    /// Names the procedure for logs, metrics and error shapes.
    #[must_use]
    pub fn name(&self, name: impl Into<String>) -> Self {
        self.extend(Definition::named(name))
    }

    /// Narrows the context type for the steps that follow.
    ///
    /// Contexts are dynamic at runtime, so this adds no step.
    #[must_use]
    pub fn context<C>(&self) -> Self {
        self.clone()
    }

    /// Appends an input step and declares `parser` as the input contract.
    #[must_use]
    pub fn input(&self, parser: impl Parser) -> Self {
        self.extend(Definition::with_input(Arc::new(parser)))
    }

    /// Appends an output step and declares `parser` as the output contract.
    #[must_use]
    pub fn output(&self, parser: impl Parser) -> Self {
        self.extend(Definition::with_output(Arc::new(parser)))
    }

    /// Appends a middleware step.
    #[must_use]
    pub fn use_middleware(&self, middleware: impl Middleware) -> Self {
        self.extend(Definition::with_step(Step::user(middleware)))
    }

    /// Appends a middleware step backed by an async closure.
    #[must_use]
    pub fn use_fn<F, Fut>(&self, name: &'static str, func: F) -> Self
    where
        F: Fn(MiddlewareOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        self.use_middleware(FnMiddleware::new(name, func))
    }

    /// Attaches a resolver closure and finalizes the procedure.
    pub fn resolve<F, Fut, R>(&self, func: F) -> Procedure
    where
        F: Fn(ResolveOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Thrown>> + Send + 'static,
        R: Serialize + 'static,
    {
        self.resolve_with(FnResolver::new(func))
    }

    /// Attaches a resolver and finalizes the procedure.
    pub fn resolve_with(&self, resolver: impl Resolver) -> Procedure {
        let def = self.def.merge_unchecked(Definition::with_resolver(Arc::new(resolver)));
        Procedure::new(def)
    }

    /// Returns the definition accumulated so far.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.def
    }
}
