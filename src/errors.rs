//! Tides Console Error Types
//!
//! This module defines the error type shared by the service and tool clients.
//! Errors never cross the client boundary as panics: the public `invoke` and
//! `call` operations fold them into `ServiceResponse::Failure` and
//! `ToolResult::Failure` values, using [`Error::kind`] to classify them.

use serde::{ Deserialize, Serialize };
use thiserror::Error;

/// Classification of a failed call, as shown to the user
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing credentials or a required parameter, caught before any network call
    ValidationError,
    /// Connection, DNS or timeout failure
    TransportError,
    /// The server answered with a non-2xx status
    HttpError,
    /// Malformed JSON or an unexpected envelope shape
    ProtocolError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::TransportError => "TransportError",
            ErrorKind::HttpError => "HttpError",
            ErrorKind::ProtocolError => "ProtocolError",
        };
        f.write_str(name)
    }
}

/// The main Error type for the console
#[derive(Error, Debug)]
pub enum Error {
    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request validation error
    #[error("{0}")]
    Validation(String),

    /// Transport-related errors (connect, DNS, timeout)
    #[error("{0}")]
    Transport(String),

    /// Non-2xx HTTP response
    #[error("HTTP {status}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Protocol errors (e.g., invalid message format)
    #[error("{0}")]
    Protocol(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error onto the user-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::Config(_) => ErrorKind::ValidationError,
            Error::Transport(_) | Error::Io(_) => ErrorKind::TransportError,
            Error::Http { .. } => ErrorKind::HttpError,
            Error::Json(_) | Error::Protocol(_) => ErrorKind::ProtocolError,
        }
    }

    /// Extra detail worth showing beneath the message, if any
    pub fn detail(&self) -> Option<String> {
        match self {
            Error::Http { body, .. } => Some(body.clone()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::Validation("x".into()).kind(), ErrorKind::ValidationError);
        assert_eq!(Error::Transport("x".into()).kind(), ErrorKind::TransportError);
        assert_eq!(
            (Error::Http { status: 502, body: String::new() }).kind(),
            ErrorKind::HttpError
        );
        assert_eq!(Error::Protocol("x".into()).kind(), ErrorKind::ProtocolError);
    }

    #[test]
    fn test_http_message_and_detail() {
        let err = Error::Http { status: 500, body: "boom".to_string() };
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.detail().as_deref(), Some("boom"));
    }

    #[test]
    fn test_json_error_is_protocol() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::ProtocolError);
        assert!(err.detail().is_none());
    }
}
