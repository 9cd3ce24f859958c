//! # Tessera
//!
//! **Composable procedure pipelines for in-process RPC**
//!
//! Tessera builds typed-at-the-edges procedures out of small steps:
//!
//! - **Immutable builders** – share a partially built pipeline across many procedures
//! - **Parser contracts** – validate input and output with any `parse` function
//! - **Uniform outcomes** – every call settles as `{ok, data}` or `{ok: false, error}`
//! - **Re-entrant extensions** – re-run a finished procedure from an outer function
//! - **Observability** – `tracing` spans per call and Prometheus metrics
//!
//! ## Quick Start
//!
//! ```
//! use serde::Deserialize;
//! use serde_json::json;
//! use tessera::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct Ledger {
//!     add: i64,
//!     sub: i64,
//! }
//!
//! # tokio_test::block_on(async {
//! let runtime = Runtime::new(RuntimeConfig::named("ledger"));
//!
//! let apply = runtime
//!     .procedure_named("apply")
//!     .input(schema::<i64>())
//!     .output(schema::<String>())
//!     .resolve(|opts: ResolveOptions| async move {
//!         let ledger: Ledger = opts.ctx_as()?;
//!         let n: i64 = opts.input_as()?;
//!         Ok::<_, Thrown>((ledger.add + n - ledger.sub).to_string())
//!     });
//!
//! let outcome = apply
//!     .call(CallOptions::new(json!({ "add": 1, "sub": 2 }), 3))
//!     .await
//!     .unwrap();
//! assert_eq!(outcome, Outcome::success("2"));
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Runtime → ProcedureBuilder → Procedure → ExtendedProcedure
//!               │                  │
//!          Definition        ChainExecutor
//! ```

#![doc(html_root_url = "https://docs.rs/tessera/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod runtime;

// Re-export core types
pub use tessera_core as core;

// Re-export pipeline types
pub use tessera_middleware as middleware;

// Re-export telemetry
pub use tessera_telemetry as telemetry;

// Re-export configuration
pub use tessera_config as config;

pub use runtime::{DefaultErrorFormatter, ErrorFormatter, FormatContext, Runtime, RuntimeConfig};

/// Prelude module for convenient imports.
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::runtime::{ErrorFormatter, FormatContext, Runtime, RuntimeConfig};

    pub use tessera_core::{
        normalize, parser_fn, schema, CallError, CallOptions, ConfigurationError, ErrorCode,
        Outcome, Overrides, Parser, ProcedureError, Thrown,
    };

    pub use tessera_middleware::{
        create_builder, BoxFuture, Definition, ExtendedProcedure, ExtensionOptions, Invoke,
        Middleware, MiddlewareOptions, Next, Procedure, ProcedureBuilder, Reinvoke,
        ResolveOptions, Resolver, StepResult,
    };

    pub use tessera_config::{ConfigLoader, TesseraConfig};
}
