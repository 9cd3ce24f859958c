//! Typed configuration system for Tessera.
//!
//! This crate provides a strongly-typed configuration system for Tessera
//! runtimes with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`TesseraConfig`] struct:
//!
//! - [`RuntimeSection`] - procedure name prefix and development mode
//! - [`LoggingSection`] - log filter and format
//! - [`MetricsSection`] - procedure metrics
//!
//! # Example
//!
//! ```no_run
//! use tessera_config::ConfigLoader;
//!
//! # fn main() -> Result<(), tessera_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("tessera.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("TESSERA")
//!     .load()?;
//!
//! println!("Runtime: {}", config.runtime.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [runtime]
//! name = "billing"
//! dev = false
//!
//! [logging]
//! enabled = true
//! level = "info,tessera_middleware=debug"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `TESSERA__RUNTIME__DEV=true`
//! - `TESSERA__LOGGING__LEVEL=debug`
//! - `TESSERA__METRICS__ENABLED=false`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
