//! Error payloads and message validation failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Code used when a lower-level failure is wrapped for the client.
pub const INTERNAL_ERROR: &str = "internal_error";

/// Code used when an inbound frame is not valid JSON.
pub const INVALID_FORMAT: &str = "invalid_format";

/// Code shared by URL and auth parameter parse failures.
pub const INVALID_REQUEST: &str = "invalid_request";

/// Error payload of a server message with type `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct Error {
    /// Machine readable error code.
    pub code: String,

    /// Human readable description.
    pub message: String,

    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Error {
    /// Create an error without details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error carrying structured details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// Wrap an arbitrary failure as `internal_error`.
    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(INTERNAL_ERROR, err.to_string())
    }

    /// The reply sent for frames that could not be parsed at all.
    pub fn invalid_format() -> Self {
        Self::new(INVALID_FORMAT, "Invalid data format.")
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Reasons a client message is rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("type missing")]
    TypeMissing,

    /// A known type arrived without its payload object.
    #[error("{0} missing")]
    PayloadMissing(&'static str),

    #[error("unsupported hello version: {0}")]
    UnsupportedVersion(String),

    #[error("params missing")]
    ParamsMissing,

    #[error("url missing")]
    UrlMissing,

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    InvalidAuthParams(#[from] serde_json::Error),

    #[error("unsupported auth type")]
    UnsupportedAuthType,

    #[error("message empty")]
    MessageEmpty,

    #[error("session id missing")]
    SessionIdMissing,

    #[error("user id missing")]
    UserIdMissing,

    #[error("unsupported recipient type {0}")]
    UnsupportedRecipientType(String),
}

impl ValidationError {
    /// Wire code reported to the client.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::TypeMissing => "type_missing",
            ValidationError::PayloadMissing(_) => "payload_missing",
            ValidationError::UnsupportedVersion(_) => "unsupported_version",
            ValidationError::ParamsMissing => "params_missing",
            ValidationError::UrlMissing => "url_missing",
            ValidationError::InvalidUrl(_) | ValidationError::InvalidAuthParams(_) => {
                INVALID_REQUEST
            }
            ValidationError::UnsupportedAuthType => "unsupported_auth_type",
            ValidationError::MessageEmpty => "message_empty",
            ValidationError::SessionIdMissing => "session_id_missing",
            ValidationError::UserIdMissing => "user_id_missing",
            ValidationError::UnsupportedRecipientType(_) => "unsupported_recipient_type",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_internal_wraps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::internal(&io);
        assert_eq!(err.code, "internal_error");
        assert_eq!(err.message, "disk on fire");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_serialized_only_when_present() {
        let plain = serde_json::to_value(Error::new("room_join_failed", "Nope")).unwrap();
        assert_eq!(plain, json!({"code": "room_join_failed", "message": "Nope"}));

        let detailed = Error::with_details("room_join_failed", "Nope", json!({"roomid": "abc"}));
        let value = serde_json::to_value(&detailed).unwrap();
        assert_eq!(value["details"]["roomid"], "abc");
        assert_eq!(detailed.to_string(), "Nope");
    }

    #[test]
    fn test_validation_error_codes() {
        let err: Error = ValidationError::TypeMissing.into();
        assert_eq!(err.code, "type_missing");
        assert_eq!(err.message, "type missing");

        let err: Error = ValidationError::PayloadMissing("hello").into();
        assert_eq!(err.message, "hello missing");

        let parse = url::Url::parse("not a url").unwrap_err();
        let expected = parse.to_string();
        let err: Error = ValidationError::from(parse).into();
        assert_eq!(err.code, INVALID_REQUEST);
        assert_eq!(err.message, expected);
    }
}
