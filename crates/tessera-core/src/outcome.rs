//! The uniform result shape of every step and procedure.

use crate::error::ProcedureError;
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Result of a step, or of a whole procedure call.
///
/// Serializes as `{"ok": true, "data": ...}` or
/// `{"ok": false, "error": <ErrorShape>}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The pipeline produced data.
    Success(Value),
    /// The pipeline failed with a normalized error.
    Failure(ProcedureError),
}

impl Outcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn success(data: impl Into<Value>) -> Self {
        Self::Success(data.into())
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failure(error: ProcedureError) -> Self {
        Self::Failure(error)
    }

    /// Returns `true` for a successful outcome.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the data of a successful outcome.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failed outcome.
    #[must_use]
    pub fn error(&self) -> Option<&ProcedureError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Value, ProcedureError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }

    /// Deserializes the data of a successful outcome.
    ///
    /// Deserialization failures are reported as internal errors.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ProcedureError> {
        match self {
            Self::Success(data) => T::deserialize(data).map_err(|e| {
                ProcedureError::internal(format!("failed to deserialize outcome data: {e}"))
            }),
            Self::Failure(error) => Err(error.clone()),
        }
    }
}

impl From<Result<Value, ProcedureError>> for Outcome {
    fn from(result: Result<Value, ProcedureError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Failure(error),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", &error.to_shape(None, false))?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_accessors() {
        let outcome = Outcome::success(json!({ "id": 7 }));
        assert!(outcome.is_ok());
        assert_eq!(outcome.data(), Some(&json!({ "id": 7 })));
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_failure_accessors() {
        let outcome = Outcome::failure(ProcedureError::bad_request("nope"));
        assert!(!outcome.is_ok());
        assert!(outcome.data().is_none());
        assert_eq!(outcome.error().map(ProcedureError::message), Some("nope"));
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_data_as() {
        let outcome = Outcome::success(json!("2"));
        let data: String = outcome.data_as().unwrap();
        assert_eq!(data, "2");

        let wrong: Result<u32, _> = outcome.data_as();
        assert!(wrong.is_err());
    }

    #[test]
    fn test_serialization() {
        let ok = serde_json::to_value(Outcome::success(json!(1))).unwrap();
        assert_eq!(ok, json!({ "ok": true, "data": 1 }));

        let failed =
            serde_json::to_value(Outcome::failure(ProcedureError::bad_request("bad"))).unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["error"]["code"], -32600);
        assert_eq!(failed["error"]["message"], "bad");
    }
}
