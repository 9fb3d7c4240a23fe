//! Error types for the HTTP server.

use std::io;
use thiserror::Error;

use crate::parser::{Error as ParserError, Method};

/// Errors that can occur while serving a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reading or parsing the request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// No route serves this path.
    #[error("Not found: {0}")]
    RouteNotFound(String),

    /// The user id is well-formed but no such user exists.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The path exists but not for this method.
    #[error("Method {method} not allowed for path: {path}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<Method>,
    },

    /// A required request field was not supplied.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// None of the representations we can produce is acceptable.
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// True when the peer went away and no response can be delivered.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::IoError(e) | Error::ParseError(ParserError::Io(e)) => is_disconnect_kind(e.kind()),
            Error::ParseError(ParserError::EmptyRequest) => true,
            _ => false,
        }
    }
}

pub(crate) fn is_disconnect_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
