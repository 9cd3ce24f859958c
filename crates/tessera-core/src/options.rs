//! Call options and per-advance overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ ctx, input }` pair a procedure is invoked with.
///
/// Never mutated by the pipeline; each step sees a derived pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Ambient context.
    #[serde(default)]
    pub ctx: Value,
    /// Raw input.
    #[serde(default)]
    pub input: Value,
}

impl CallOptions {
    /// Creates call options from a context and an input.
    #[must_use]
    pub fn new(ctx: impl Into<Value>, input: impl Into<Value>) -> Self {
        Self {
            ctx: ctx.into(),
            input: input.into(),
        }
    }

    /// Applies overrides, replacing (never merging) each side that is set.
    #[must_use]
    pub fn apply(self, overrides: Overrides) -> Self {
        Self {
            ctx: overrides.ctx.unwrap_or(self.ctx),
            input: overrides.input.unwrap_or(self.input),
        }
    }
}

/// Replacement context and/or input for the next advance.
///
/// A context override replaces the whole context. Callers wanting a
/// partial update must pass an already merged object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Replacement context.
    pub ctx: Option<Value>,
    /// Replacement input.
    pub input: Option<Value>,
}

impl Overrides {
    /// No overrides.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Overrides the context.
    #[must_use]
    pub fn ctx(mut self, ctx: impl Into<Value>) -> Self {
        self.ctx = Some(ctx.into());
        self
    }

    /// Overrides the input.
    #[must_use]
    pub fn input(mut self, input: impl Into<Value>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Returns `true` if nothing is overridden.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ctx.is_none() && self.input.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_override_replaces() {
        let opts = CallOptions::new(json!({ "add": 1, "sub": 2 }), 3);
        let derived = opts.apply(Overrides::none().ctx(json!({ "add": 10 })));
        assert_eq!(derived.ctx, json!({ "add": 10 }));
        assert_eq!(derived.input, json!(3));
    }

    #[test]
    fn test_input_override_keeps_context() {
        let opts = CallOptions::new(json!({ "user": "ada" }), "raw");
        let derived = opts.apply(Overrides::none().input(json!(5)));
        assert_eq!(derived.ctx, json!({ "user": "ada" }));
        assert_eq!(derived.input, json!(5));
    }

    #[test]
    fn test_empty_overrides() {
        assert!(Overrides::none().is_empty());
        assert!(!Overrides::none().input(1).is_empty());

        let opts = CallOptions::new(json!({}), 1);
        assert_eq!(opts.clone().apply(Overrides::none()), opts);
    }

    #[test]
    fn test_deserialize_missing_fields_default_to_null() {
        let opts: CallOptions = serde_json::from_value(json!({ "input": 4 })).unwrap();
        assert_eq!(opts.ctx, Value::Null);
        assert_eq!(opts.input, json!(4));
    }
}
