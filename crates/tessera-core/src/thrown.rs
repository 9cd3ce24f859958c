//! Raised values and their normalization.
//!
//! A step "throws" by returning `Err(Thrown)`. Whatever was raised, the
//! executor turns it into a [`ProcedureError`] at the step boundary with
//! [`normalize`], so callers only ever see normalized errors.

use crate::error::{Cause, ConfigurationError, ErrorCode, ProcedureError};
use serde_json::{Map, Value};
use std::any::Any;

/// A value raised by a step, resolver or parser.
#[derive(Debug)]
pub enum Thrown {
    /// Already the system error type. Passed through unchanged.
    Error(ProcedureError),
    /// An exception-like error with a message and source chain.
    Exception(anyhow::Error),
    /// Raised data: a primitive or a plain object.
    Value(Value),
    /// Nothing was raised with the failure.
    Undefined,
    /// A non-data value such as a callback. Its cause is dropped.
    Opaque,
    /// The pipeline itself is malformed. Never normalized by the executor.
    Configuration(ConfigurationError),
}

impl Thrown {
    /// Wraps any standard error as an exception.
    pub fn exception<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Exception(anyhow::Error::new(error))
    }

    /// Converts a panic payload caught at a step boundary.
    ///
    /// String payloads keep their message; anything else is opaque.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<String>() {
            Ok(message) => Self::Exception(anyhow::Error::msg(*message)),
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => Self::Exception(anyhow::Error::msg(*message)),
                Err(_) => Self::Opaque,
            },
        }
    }

    /// Returns `true` for configuration errors.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<ProcedureError> for Thrown {
    fn from(error: ProcedureError) -> Self {
        Self::Error(error)
    }
}

impl From<anyhow::Error> for Thrown {
    fn from(error: anyhow::Error) -> Self {
        Self::Exception(error)
    }
}

impl From<serde_json::Error> for Thrown {
    fn from(error: serde_json::Error) -> Self {
        Self::exception(error)
    }
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Thrown {
    fn from(message: &str) -> Self {
        Self::Value(Value::from(message))
    }
}

impl From<String> for Thrown {
    fn from(message: String) -> Self {
        Self::Value(Value::from(message))
    }
}

impl From<ConfigurationError> for Thrown {
    fn from(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }
}

impl From<crate::error::CallError> for Thrown {
    fn from(error: crate::error::CallError) -> Self {
        match error {
            crate::error::CallError::Failed(error) => Self::Error(error),
            crate::error::CallError::Configuration(error) => Self::Configuration(error),
        }
    }
}

/// Normalizes a raised value into a [`ProcedureError`].
///
/// Unknown failures are classified as `INTERNAL_SERVER_ERROR`.
///
/// # Example
///
/// ```
/// use tessera_core::{normalize, ErrorCode, Thrown};
///
/// let error = normalize(Thrown::from("out of widgets"));
/// assert_eq!(error.code(), ErrorCode::InternalServerError);
/// assert_eq!(error.message(), "out of widgets");
/// ```
#[must_use]
pub fn normalize(thrown: Thrown) -> ProcedureError {
    normalize_as(thrown, ErrorCode::InternalServerError)
}

/// Normalizes a raised value, classifying unknown failures with `code`.
///
/// A [`ProcedureError`], raised directly or wrapped inside an
/// `anyhow::Error`, keeps its own code.
#[must_use]
pub fn normalize_as(thrown: Thrown, code: ErrorCode) -> ProcedureError {
    match thrown {
        Thrown::Error(error) => error,
        Thrown::Exception(error) => match error.downcast::<ProcedureError>() {
            Ok(error) => error,
            Err(error) => ProcedureError::from_parts(code, None, Some(Cause::from_error(&error))),
        },
        other => ProcedureError::from_parts(code, None, cause_from_unknown(other)),
    }
}

/// Extracts a [`Cause`] from a raised value, if one should survive.
///
/// `null`, [`Thrown::Undefined`] and [`Thrown::Opaque`] drop the cause.
#[must_use]
pub fn cause_from_unknown(thrown: Thrown) -> Option<Cause> {
    match thrown {
        Thrown::Error(error) => Some(
            error
                .cause()
                .cloned()
                .unwrap_or_else(|| Cause::message(error.message())),
        ),
        Thrown::Exception(error) => Some(Cause::from_error(&error)),
        Thrown::Configuration(error) => Some(Cause::message(error.to_string())),
        Thrown::Undefined | Thrown::Opaque => None,
        Thrown::Value(value) => cause_from_value(value),
    }
}

fn cause_from_value(value: Value) -> Option<Cause> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(Cause::message(message)),
        Value::Bool(_) | Value::Number(_) => Some(Cause::message(value.to_string())),
        Value::Object(properties) => Some(Cause::from_properties(properties)),
        Value::Array(items) => {
            let properties: Map<String, Value> = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect();
            Some(Cause::from_properties(properties))
        }
    }
}
