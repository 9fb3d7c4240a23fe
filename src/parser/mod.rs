//! HTTP/1.1 message parsing.
//!
//! Reads request heads off a buffered connection with hard size limits,
//! turns them into [`HttpRequest`] values and validates the grammar. The
//! same line and header machinery also reads responses back for clients
//! and tests.

mod error;
mod headers;
mod method;
mod reader;
mod request;
mod response;
mod version;

// Re-export public items
pub use error::Error;
pub use headers::Headers;
pub use method::Method;
pub use reader::{read_header_lines, read_line, MAX_BODY, MAX_HEADERS, MAX_LINE};
pub use request::{
    parse_headers, parse_request, parse_request_line, validate_host, HttpRequest, ParseLimits,
    QueryParams,
};
pub use response::{parse_response, parse_status_line, ParsedResponse};
pub use version::HttpVersion;
