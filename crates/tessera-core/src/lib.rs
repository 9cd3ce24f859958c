//! # Tessera Core
//!
//! Core types for the Tessera procedure pipeline.
//!
//! This crate provides the values every pipeline step exchanges:
//!
//! - [`Outcome`] - The uniform `{ ok, data }` / `{ ok: false, error }` result
//! - [`ProcedureError`] - The normalized error, classified by [`ErrorCode`]
//! - [`Thrown`] - A raised value, turned into a [`ProcedureError`] by [`normalize`]
//! - [`CallOptions`] / [`Overrides`] - The `{ ctx, input }` pair and its replacements
//! - [`Parser`] - The validation contract behind input and output steps

#![doc(html_root_url = "https://docs.rs/tessera-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod options;
mod outcome;
pub mod parser;
mod thrown;

pub use error::{
    CallError, Cause, ConfigurationError, ErrorCode, ErrorData, ErrorShape, ProcedureError,
    ProcedureResult,
};
pub use options::{CallOptions, Overrides};
pub use outcome::Outcome;
pub use parser::{parser_fn, schema, FnParser, Parser, Schema};
pub use thrown::{cause_from_unknown, normalize, normalize_as, Thrown};
