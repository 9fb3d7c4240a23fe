//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while reading and parsing an HTTP message.
#[derive(Debug, Error)]
pub enum Error {
    /// A request line ran past the line limit before a terminator was found.
    #[error("Request line is too long (limit {0} bytes)")]
    LineTooLong(usize),

    /// A header line ran past the line limit before a terminator was found.
    #[error("Header line is too long (limit {0} bytes)")]
    HeaderLineTooLong(usize),

    /// The request line is not exactly `method target version`.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The version token is anything other than `HTTP/1.1`.
    #[error("Unsupported HTTP version: {0}")]
    UnsupportedVersion(String),

    /// More header lines than the configured ceiling.
    #[error("Too many headers (limit {0})")]
    TooManyHeaders(usize),

    /// A header line has no `name: value` shape.
    #[error("Invalid header format: {0}")]
    InvalidHeaderFormat(String),

    /// The request carries no `Host` header.
    #[error("Host header is missing")]
    MissingHost,

    /// The `Host` header names some other server.
    #[error("Unknown host: {0}")]
    UnknownHost(String),

    /// The target cannot be resolved into a URI.
    #[error("Invalid request target: {0}")]
    InvalidTarget(String),

    /// The `Content-Length` header is not a decimal byte count.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The declared `Content-Length` is above the body ceiling.
    #[error("Body too large: {declared} bytes declared (limit {limit})")]
    BodyTooLarge { declared: usize, limit: usize },

    /// The peer closed before sending the declared number of body bytes.
    #[error("Body truncated: expected {expected} bytes")]
    TruncatedBody { expected: usize },

    /// The peer closed without sending a request line.
    #[error("Empty request")]
    EmptyRequest,

    /// The status line of a response could not be parsed.
    #[error("Malformed status line: {0}")]
    MalformedStatusLine(String),

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
