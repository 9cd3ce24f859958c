//! Built-in step implementations.
//!
//! - [`validation`] - Input and output parser adapters
//! - [`resolve`] - Terminal resolver step

pub mod resolve;
pub mod validation;

pub use resolve::{FnResolver, ResolveOptions, Resolver};
pub use validation::{InputParser, OutputParser};
