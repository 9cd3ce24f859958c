//! Error types for Tessera.
//!
//! This module provides [`ProcedureError`], the normalized error carried by
//! every failed [`Outcome`](crate::Outcome), together with the code table it
//! is classified by and the errors that signal a malformed pipeline.
//!
//! # Error codes
//!
//! Codes follow the JSON-RPC 2.0 convention. The `-32000..=-32099` range is
//! reserved for implementation-defined errors; Tessera reuses the last digits
//! of the equivalent HTTP 4XX status there.
//!
//! | `ErrorCode` | JSON-RPC | HTTP |
//! |---|---|---|
//! | `ParseError` | -32700 | 400 |
//! | `BadRequest` | -32600 | 400 |
//! | `InternalServerError` | -32603 | 500 |
//! | `NotImplemented` | -32603 | 501 |
//! | `Unauthorized` | -32001 | 401 |
//! | `Forbidden` | -32003 | 403 |
//! | `NotFound` | -32004 | 404 |
//! | `MethodNotSupported` | -32005 | 405 |
//! | `Timeout` | -32008 | 408 |
//! | `Conflict` | -32009 | 409 |
//! | `PreconditionFailed` | -32012 | 412 |
//! | `PayloadTooLarge` | -32013 | 413 |
//! | `UnprocessableContent` | -32022 | 422 |
//! | `TooManyRequests` | -32029 | 429 |
//! | `ClientClosedRequest` | -32099 | 499 |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Result type alias using [`ProcedureError`].
pub type ProcedureResult<T> = Result<T, ProcedureError>;

/// Classification of a [`ProcedureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The raw payload could not be parsed at all.
    ParseError,
    /// The input did not satisfy the declared input contract.
    BadRequest,
    /// Anything unexpected, including normalized unknown failures.
    InternalServerError,
    /// The procedure exists but is not implemented.
    NotImplemented,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Credentials are valid but insufficient.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The procedure does not support the requested call style.
    MethodNotSupported,
    /// The call took too long.
    Timeout,
    /// Concurrent modification or duplicate resource.
    Conflict,
    /// A precondition of the call was not met.
    PreconditionFailed,
    /// The input was too large.
    PayloadTooLarge,
    /// The input was well-formed but semantically invalid.
    UnprocessableContent,
    /// Rate limited.
    TooManyRequests,
    /// The caller went away before the call completed.
    ClientClosedRequest,
}

impl ErrorCode {
    /// Returns the JSON-RPC numeric code.
    #[must_use]
    pub const fn json_rpc_code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::BadRequest => -32600,
            Self::InternalServerError | Self::NotImplemented => -32603,
            Self::Unauthorized => -32001,
            Self::Forbidden => -32003,
            Self::NotFound => -32004,
            Self::MethodNotSupported => -32005,
            Self::Timeout => -32008,
            Self::Conflict => -32009,
            Self::PreconditionFailed => -32012,
            Self::PayloadTooLarge => -32013,
            Self::UnprocessableContent => -32022,
            Self::TooManyRequests => -32029,
            Self::ClientClosedRequest => -32099,
        }
    }

    /// Returns the HTTP-equivalent status for this code.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ParseError | Self::BadRequest => 400,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotSupported => 405,
            Self::Timeout => 408,
            Self::Conflict => 409,
            Self::PreconditionFailed => 412,
            Self::PayloadTooLarge => 413,
            Self::UnprocessableContent => 422,
            Self::TooManyRequests => 429,
            Self::ClientClosedRequest => 499,
        }
    }

    /// Returns the machine-readable key, e.g. `"BAD_REQUEST"`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            Self::Timeout => "TIMEOUT",
            Self::Conflict => "CONFLICT",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::UnprocessableContent => "UNPROCESSABLE_CONTENT",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ClientClosedRequest => "CLIENT_CLOSED_REQUEST",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The normalized cause behind a [`ProcedureError`].
///
/// Exceptions keep their message, source chain and (when captured) their
/// backtrace. Plain data objects keep their properties so structured cause
/// information survives normalization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct Cause {
    /// Human-readable cause message. May be empty for data-only causes.
    pub message: String,
    /// Messages of the source chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
    /// Originating backtrace, when one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
    /// Properties copied from a thrown data object.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Cause {
    /// Creates a message-only cause.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Creates a cause from an exception-like error.
    #[must_use]
    pub fn from_error(error: &anyhow::Error) -> Self {
        let backtrace = match error.backtrace().status() {
            std::backtrace::BacktraceStatus::Captured => Some(error.backtrace().to_string()),
            _ => None,
        };

        Self {
            message: error.to_string(),
            chain: error.chain().skip(1).map(ToString::to_string).collect(),
            backtrace,
            properties: Map::new(),
        }
    }

    /// Creates a synthetic cause whose properties are copied from a data object.
    ///
    /// A string `message` property becomes the cause message.
    #[must_use]
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        let message = properties
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self {
            message,
            properties,
            ..Self::default()
        }
    }

    /// Returns the best available stack description for this cause.
    ///
    /// The message and its `caused by:` chain come first, followed by the
    /// captured backtrace when there is one.
    #[must_use]
    pub fn stack(&self) -> Option<String> {
        if self.chain.is_empty() && self.backtrace.is_none() {
            return None;
        }
        let mut lines = vec![self.message.clone()];
        lines.extend(self.chain.iter().map(|m| format!("caused by: {m}")));
        lines.extend(self.backtrace.iter().cloned());
        Some(lines.join("\n"))
    }
}

/// The normalized error of the procedure pipeline.
///
/// Every failed step, and every failed procedure call, carries one of these.
///
/// # Example
///
/// ```
/// use tessera_core::{ErrorCode, ProcedureError};
///
/// let error = ProcedureError::new(ErrorCode::NotFound, "no such widget");
/// assert_eq!(error.code(), ErrorCode::NotFound);
/// assert_eq!(error.to_string(), "no such widget");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ProcedureError {
    code: ErrorCode,
    message: String,
    #[source]
    cause: Option<Cause>,
}

impl ProcedureError {
    /// Creates an error with an explicit message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an error from its parts.
    ///
    /// The message is the explicit message if given, else the cause message
    /// if non-empty, else the code key.
    #[must_use]
    pub fn from_parts(code: ErrorCode, message: Option<String>, cause: Option<Cause>) -> Self {
        let message = message
            .or_else(|| {
                cause
                    .as_ref()
                    .filter(|c| !c.message.is_empty())
                    .map(|c| c.message.clone())
            })
            .unwrap_or_else(|| code.key().to_string());

        Self {
            code,
            message,
            cause,
        }
    }

    /// Creates a `BAD_REQUEST` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Creates an `INTERNAL_SERVER_ERROR` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }

    /// Attaches a cause, keeping the existing message.
    #[must_use]
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the normalized cause, if any survived normalization.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Converts this error into the default error shape.
    ///
    /// `path` names the procedure that failed. The stack is only included
    /// when `include_stack` is set, which should be limited to development.
    #[must_use]
    pub fn to_shape(&self, path: Option<&str>, include_stack: bool) -> ErrorShape {
        ErrorShape {
            code: self.code.json_rpc_code(),
            message: self.message.clone(),
            data: ErrorData {
                code: self.code,
                http_status: self.code.http_status(),
                path: path.map(ToString::to_string),
                stack: if include_stack {
                    self.cause.as_ref().and_then(Cause::stack)
                } else {
                    None
                },
            },
        }
    }
}

/// The default serializable shape of a [`ProcedureError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorShape {
    /// JSON-RPC numeric code.
    pub code: i32,
    /// Error message.
    pub message: String,
    /// Additional error data.
    pub data: ErrorData,
}

/// Data section of an [`ErrorShape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// HTTP-equivalent status.
    pub http_status: u16,
    /// Name of the procedure that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Originating stack, development mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A malformed pipeline.
///
/// These are programmer errors in pipeline construction. They are never
/// turned into a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The chain advanced past its last step without reaching a resolver.
    #[error(
        "no result from the step chain: position {index} is past the last of {len} steps \
         (did you forget to attach a resolver?)"
    )]
    MissingResolver {
        /// Position that was requested.
        index: usize,
        /// Number of steps in the chain.
        len: usize,
    },

    /// A definition that already ends in a resolver cannot accept more steps.
    #[error("definition is already finalized by a resolver")]
    AlreadyFinalized,
}

/// Error returned by a full re-invocation of a procedure from an extension.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// The procedure ran and produced a failed outcome.
    #[error(transparent)]
    Failed(#[from] ProcedureError),

    /// The procedure is malformed.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl CallError {
    /// Returns the procedure error, if the call failed at runtime.
    #[must_use]
    pub fn procedure_error(&self) -> Option<&ProcedureError> {
        match self {
            Self::Failed(error) => Some(error),
            Self::Configuration(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_table() {
        assert_eq!(ErrorCode::ParseError.json_rpc_code(), -32700);
        assert_eq!(ErrorCode::BadRequest.json_rpc_code(), -32600);
        assert_eq!(ErrorCode::NotImplemented.json_rpc_code(), -32603);
        assert_eq!(ErrorCode::TooManyRequests.http_status(), 429);
        assert_eq!(ErrorCode::ClientClosedRequest.http_status(), 499);
        assert_eq!(ErrorCode::UnprocessableContent.key(), "UNPROCESSABLE_CONTENT");
    }

    #[test]
    fn test_error_code_serializes_as_key() {
        let json = serde_json::to_value(ErrorCode::InternalServerError).unwrap();
        assert_eq!(json, "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_message_falls_back_to_cause_then_code() {
        let error = ProcedureError::from_parts(
            ErrorCode::InternalServerError,
            None,
            Some(Cause::message("disk on fire")),
        );
        assert_eq!(error.message(), "disk on fire");

        let error = ProcedureError::from_parts(ErrorCode::Timeout, None, None);
        assert_eq!(error.message(), "TIMEOUT");

        let error = ProcedureError::from_parts(
            ErrorCode::Conflict,
            Some("explicit".to_string()),
            Some(Cause::message("ignored")),
        );
        assert_eq!(error.message(), "explicit");
    }

    #[test]
    fn test_cause_from_properties() {
        let mut properties = Map::new();
        properties.insert("message".to_string(), Value::from("quota exceeded"));
        properties.insert("limit".to_string(), Value::from(10));

        let cause = Cause::from_properties(properties);
        assert_eq!(cause.message, "quota exceeded");
        assert_eq!(cause.properties["limit"], 10);
    }

    #[test]
    fn test_cause_from_error_keeps_chain() {
        let error = anyhow::anyhow!("socket closed").context("fetching widget");
        let cause = Cause::from_error(&error);
        assert_eq!(cause.message, "fetching widget");
        assert_eq!(cause.chain, vec!["socket closed".to_string()]);
        assert!(cause.stack().unwrap().contains("caused by: socket closed"));
    }

    #[test]
    fn test_stack_keeps_chain_when_backtrace_captured() {
        let cause = Cause {
            message: "fetching widget".to_string(),
            chain: vec!["socket closed".to_string()],
            backtrace: Some("   0: widgets::fetch".to_string()),
            ..Cause::default()
        };

        assert_eq!(
            cause.stack().as_deref(),
            Some("fetching widget\ncaused by: socket closed\n   0: widgets::fetch")
        );

        let bare = Cause::default();
        assert!(bare.stack().is_none());
    }

    #[test]
    fn test_shape_hides_stack_outside_development() {
        let error = ProcedureError::internal("boom").with_cause(Cause {
            message: "boom".to_string(),
            chain: vec!["root".to_string()],
            ..Cause::default()
        });

        let shape = error.to_shape(Some("widget.get"), false);
        assert_eq!(shape.code, -32603);
        assert_eq!(shape.data.http_status, 500);
        assert_eq!(shape.data.path.as_deref(), Some("widget.get"));
        assert!(shape.data.stack.is_none());

        let shape = error.to_shape(None, true);
        assert!(shape.data.stack.is_some());
    }

    #[test]
    fn test_shape_serializes_camel_case() {
        let shape = ProcedureError::bad_request("nope").to_shape(None, false);
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["data"]["httpStatus"], 400);
        assert_eq!(json["data"]["code"], "BAD_REQUEST");
        assert!(json["data"].get("path").is_none());
    }

    #[test]
    fn test_configuration_error_display() {
        let error = ConfigurationError::MissingResolver { index: 2, len: 2 };
        assert!(error.to_string().contains("resolver"));
    }

    #[test]
    fn test_call_error_accessor() {
        let failed = CallError::from(ProcedureError::bad_request("bad"));
        assert_eq!(
            failed.procedure_error().map(ProcedureError::code),
            Some(ErrorCode::BadRequest)
        );

        let misconfigured = CallError::from(ConfigurationError::AlreadyFinalized);
        assert!(misconfigured.procedure_error().is_none());
    }
}
