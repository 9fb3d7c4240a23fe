//! Translation of failures into HTTP error responses.

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};

/// A failure expressed as the response the client should see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} {reason}", .status.as_u16())]
pub struct HttpFault {
    pub status: StatusCode,
    pub reason: String,
    /// Body text; the reason phrase is sent when absent.
    pub detail: Option<String>,
    /// Extra headers such as `Allow`.
    pub headers: Vec<(String, String)>,
}

impl HttpFault {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.reason_phrase().to_string(),
            detail: None,
            headers: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The catch-all for failures that are bugs rather than bad requests.
    /// Never carries the underlying error text.
    pub fn internal() -> Self {
        Self::new(StatusCode::InternalServerError)
    }

    /// True for 5xx faults.
    pub fn is_server_error(&self) -> bool {
        self.status.as_u16() >= 500
    }

    /// Render as a response with a plain-text body and its byte length.
    pub fn into_response(self) -> HttpResponse {
        let body = self.detail.unwrap_or_else(|| self.reason.clone());
        let mut response = HttpResponse::new(self.status).with_reason(self.reason);
        for (name, value) in self.headers {
            response = response.with_header(name, value);
        }
        response
            .with_content_type("text/plain; charset=utf-8")
            .with_body_string(body)
    }
}

impl From<&ParserError> for HttpFault {
    fn from(err: &ParserError) -> Self {
        match err {
            ParserError::LineTooLong(_) => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Request line is too long")
            }
            ParserError::HeaderLineTooLong(_) => {
                HttpFault::new(StatusCode::RequestHeaderTooLarge).with_detail("Header line is too long")
            }
            ParserError::MalformedRequestLine(_) => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Malformed request line")
            }
            ParserError::UnsupportedVersion(_) => HttpFault::new(StatusCode::HttpVersionNotSupported),
            ParserError::TooManyHeaders(_) => {
                HttpFault::new(StatusCode::RequestHeaderTooLarge).with_detail("Too many headers")
            }
            ParserError::InvalidHeaderFormat(_) => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Malformed header line")
            }
            ParserError::MissingHost => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Host header is missing")
            }
            ParserError::UnknownHost(_) => HttpFault::new(StatusCode::NotFound),
            ParserError::InvalidTarget(_) => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Invalid request target")
            }
            ParserError::InvalidContentLength(_) => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Invalid Content-Length")
            }
            ParserError::BodyTooLarge { .. } => {
                HttpFault::new(StatusCode::PayloadTooLarge).with_detail("Request body is too large")
            }
            ParserError::TruncatedBody { .. } => {
                HttpFault::new(StatusCode::BadRequest).with_detail("Request body is truncated")
            }
            ParserError::EmptyRequest => HttpFault::new(StatusCode::BadRequest).with_detail("Empty request"),
            ParserError::MalformedStatusLine(_) | ParserError::Io(_) => HttpFault::internal(),
        }
    }
}

impl From<&Error> for HttpFault {
    fn from(err: &Error) -> Self {
        match err {
            Error::ParseError(e) => HttpFault::from(e),
            Error::RouteNotFound(_) | Error::UserNotFound(_) => HttpFault::new(StatusCode::NotFound),
            Error::MethodNotAllowed { allowed, .. } => {
                let allow = allowed
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                let mut fault = HttpFault::new(StatusCode::MethodNotAllowed);
                fault.headers.push(("Allow".to_string(), allow));
                fault
            }
            Error::MissingField(field) => {
                HttpFault::new(StatusCode::BadRequest).with_detail(format!("Missing required field: {field}"))
            }
            Error::NotAcceptable(_) => HttpFault::new(StatusCode::NotAcceptable)
                .with_detail("Supported types: text/html, application/json"),
            Error::IoError(_) | Error::InternalError(_) | Error::JsonError(_) => HttpFault::internal(),
        }
    }
}
