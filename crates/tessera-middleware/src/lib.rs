//! # Tessera Middleware
//!
//! Pipeline construction and execution for Tessera procedures.
//!
//! A procedure is an ordered chain of steps ending in a resolver. This
//! crate provides the builder that accumulates those steps, the executor
//! that runs them, and the extension wrapper that re-runs a finished
//! procedure from an outer function.
//!
//! ## Pipeline
//!
//! ```text
//! (ctx, input) → [step] → [step] → ... → Resolver
//!                   ↑        ↑              ↓
//! Outcome ←─────────┴────────┴──────────────┘
//! ```
//!
//! | Step kind  | Created by                      | Role                                  |
//! |------------|---------------------------------|---------------------------------------|
//! | Input      | [`ProcedureBuilder::input`]     | Parses the input, `BAD_REQUEST` on failure |
//! | Output     | [`ProcedureBuilder::output`]    | Parses the resolver's data on the way back |
//! | Middleware | [`ProcedureBuilder::use_middleware`] | Anything; may override ctx or input |
//! | Resolver   | [`ProcedureBuilder::resolve`]   | Produces the data and ends the chain  |
//!
//! ## Key Features
//!
//! - **Immutable composition**: every builder method returns a new builder
//! - **Uniform results**: every call settles as an [`Outcome`](tessera_core::Outcome)
//! - **Re-entrant extensions**: [`Reinvoke`] runs the whole procedure again
//! - **Concurrent**: a procedure holds no per-call state
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use tessera_core::{schema, CallOptions, Thrown};
//! use tessera_middleware::{create_builder, ResolveOptions};
//!
//! # tokio_test::block_on(async {
//! let greet = create_builder()
//!     .name("greet")
//!     .input(schema::<String>())
//!     .output(schema::<String>())
//!     .resolve(|opts: ResolveOptions| async move {
//!         let name: String = opts.input_as()?;
//!         Ok::<_, Thrown>(format!("hello, {name}"))
//!     });
//!
//! let outcome = greet.call(CallOptions::new(json!({}), "ada")).await.unwrap();
//! assert_eq!(outcome.data(), Some(&json!("hello, ada")));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod chain;
pub mod definition;
pub mod extension;
pub mod middleware;
pub mod procedure;
pub mod stages;
pub mod step;

// Re-export main types at crate root
pub use builder::{create_builder, ProcedureBuilder};
pub use chain::ChainExecutor;
pub use definition::{Definition, ANONYMOUS};
pub use extension::{ExtendedProcedure, ExtensionOptions, Invoke, Reinvoke};
pub use middleware::{BoxFuture, FnMiddleware, Middleware, MiddlewareOptions, Next, StepResult};
pub use procedure::Procedure;
pub use stages::{FnResolver, InputParser, OutputParser, ResolveOptions, Resolver};
pub use step::{Step, StepKind};
