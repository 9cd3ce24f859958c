//! The validation contract consumed by the parser steps.
//!
//! Any type implementing [`Parser`] can be declared as the input or output
//! contract of a procedure. A parser either returns the parsed value or
//! raises a [`Thrown`] value, which the pipeline normalizes.
//!
//! Two implementations ship with the crate:
//!
//! - [`Schema<T>`] - parses by deserializing into `T` and serializing back,
//!   so defaults, renames and `deny_unknown_fields` all apply
//! - [`FnParser`] - wraps a closure
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tessera_core::{parser_fn, schema, Parser};
//!
//! let number = schema::<i64>();
//! assert_eq!(number.parse(json!(3)).unwrap(), json!(3));
//! assert!(number.parse(json!("x")).is_err());
//!
//! let non_empty = parser_fn(|raw| match raw.as_str() {
//!     Some(s) if !s.is_empty() => Ok(raw),
//!     _ => Err("expected a non-empty string".into()),
//! });
//! assert!(non_empty.parse(json!("")).is_err());
//! ```

use crate::thrown::Thrown;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A validation contract: `parse(raw) -> value | throws`.
pub trait Parser: Send + Sync + 'static {
    /// Parses a raw value.
    fn parse(&self, raw: Value) -> Result<Value, Thrown>;

    /// Returns a name for logging.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A parser backed by a serde type.
pub struct Schema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Schema<T> {
    /// Creates a parser for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Parser for Schema<T>
where
    T: DeserializeOwned + Serialize + 'static,
{
    fn parse(&self, raw: Value) -> Result<Value, Thrown> {
        let parsed: T = serde_json::from_value(raw)?;
        Ok(serde_json::to_value(parsed)?)
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Creates a [`Schema`] parser for `T`.
#[must_use]
pub const fn schema<T>() -> Schema<T> {
    Schema::new()
}

/// A parser backed by a closure.
pub struct FnParser<F> {
    f: F,
}

impl<F> fmt::Debug for FnParser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnParser").finish_non_exhaustive()
    }
}

impl<F> Parser for FnParser<F>
where
    F: Fn(Value) -> Result<Value, Thrown> + Send + Sync + 'static,
{
    fn parse(&self, raw: Value) -> Result<Value, Thrown> {
        (self.f)(raw)
    }

    fn name(&self) -> &'static str {
        "fn_parser"
    }
}

/// Creates a parser from a closure.
pub fn parser_fn<F>(f: F) -> FnParser<F>
where
    F: Fn(Value) -> Result<Value, Thrown> + Send + Sync + 'static,
{
    FnParser { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Widget {
        id: u32,
        #[serde(default)]
        label: String,
    }

    #[test]
    fn test_schema_applies_defaults() {
        let parsed = schema::<Widget>().parse(json!({ "id": 4 })).unwrap();
        assert_eq!(parsed, json!({ "id": 4, "label": "" }));
    }

    #[test]
    fn test_schema_rejects_unknown_fields() {
        let result = schema::<Widget>().parse(json!({ "id": 4, "extra": true }));
        assert!(matches!(result, Err(Thrown::Exception(_))));
    }

    #[test]
    fn test_schema_rejects_wrong_type() {
        assert!(schema::<String>().parse(json!(3)).is_err());
        assert_eq!(schema::<String>().parse(json!("3")).unwrap(), json!("3"));
    }

    #[test]
    fn test_fn_parser() {
        let even = parser_fn(|raw| match raw.as_i64() {
            Some(n) if n % 2 == 0 => Ok(raw),
            _ => Err(Thrown::from("expected an even number")),
        });
        assert!(even.parse(json!(4)).is_ok());
        assert!(matches!(even.parse(json!(5)), Err(Thrown::Value(_))));
        assert_eq!(even.name(), "fn_parser");
    }

    #[test]
    fn test_schema_name() {
        assert!(schema::<Widget>().name().ends_with("Widget"));
    }
}
