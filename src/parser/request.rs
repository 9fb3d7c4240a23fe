//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt};
use url::Url;

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::method::Method;
use crate::parser::reader::{read_header_lines, read_line, MAX_BODY, MAX_HEADERS, MAX_LINE};
use crate::parser::version::HttpVersion;

/// Decoded query parameters. A name may repeat, so each maps to a list.
pub type QueryParams = HashMap<String, Vec<String>>;

/// Size ceilings applied while reading a message head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Longest request line or header line, terminator excluded.
    pub max_line_len: usize,
    /// Most header lines in one message.
    pub max_headers: usize,
    /// Largest body [`HttpRequest::read_body`] will accept.
    pub max_body_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_line_len: MAX_LINE,
            max_headers: MAX_HEADERS,
            max_body_len: MAX_BODY,
        }
    }
}

/// Represents a parsed HTTP request.
///
/// The request line and headers are fixed once parsed. The URL, path and
/// query are derived from the target on first use and cached.
#[derive(Debug)]
pub struct HttpRequest {
    method: Method,
    target: String,
    version: HttpVersion,
    headers: Headers,
    url: OnceLock<Result<Url, String>>,
    query: OnceLock<QueryParams>,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a new HTTP request with no body read yet.
    pub fn new(method: Method, target: impl Into<String>, version: HttpVersion, headers: Headers) -> Self {
        Self {
            method,
            target: target.into(),
            version,
            headers,
            url: OnceLock::new(),
            query: OnceLock::new(),
            body: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw request target, exactly as it appeared on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of a header (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// The target resolved into a full URL.
    ///
    /// Origin-form targets are resolved against the `Host` header, which
    /// the server has already checked names it.
    pub fn url(&self) -> Result<&Url, Error> {
        self.url
            .get_or_init(|| parse_target(&self.target, self.headers.get("Host").unwrap_or("localhost")))
            .as_ref()
            .map_err(|reason| Error::InvalidTarget(reason.clone()))
    }

    /// Path component of the target, with dot segments removed.
    pub fn path(&self) -> Result<&str, Error> {
        Ok(self.url()?.path())
    }

    /// Query parameters decoded with `application/x-www-form-urlencoded`
    /// rules. Parameters with blank values are dropped.
    pub fn query(&self) -> Result<&QueryParams, Error> {
        let url = self.url()?;
        Ok(self.query.get_or_init(|| {
            url.query()
                .map(|q| parse_form(q.as_bytes()))
                .unwrap_or_default()
        }))
    }

    /// First value of a query parameter.
    pub fn get_query_param(&self, name: &str) -> Result<Option<&str>, Error> {
        Ok(self
            .query()?
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str))
    }

    /// The declared `Content-Length`, if any.
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        match self.headers.get("Content-Length") {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|_| Error::InvalidContentLength(raw.to_string())),
        }
    }

    /// Read the body from the rest of the connection.
    ///
    /// Without a `Content-Length` header there is no body. A declared length
    /// above `max_len` is [`Error::BodyTooLarge`] and nothing is read.
    /// Otherwise exactly that many bytes are read; fewer means the peer hung
    /// up early and is a [`Error::TruncatedBody`]. The body is read at most
    /// once.
    pub async fn read_body<R>(&mut self, reader: &mut R, max_len: usize) -> Result<Option<&[u8]>, Error>
    where
        R: AsyncRead + Unpin,
    {
        if self.body.is_none() {
            let Some(expected) = self.content_length()? else {
                return Ok(None);
            };
            if expected > max_len {
                return Err(Error::BodyTooLarge { declared: expected, limit: max_len });
            }

            // Grow as bytes arrive instead of trusting the declared size.
            let mut body = Vec::new();
            (&mut *reader).take(expected as u64).read_to_end(&mut body).await?;
            if body.len() < expected {
                return Err(Error::TruncatedBody { expected });
            }
            self.body = Some(body);
        }

        Ok(self.body.as_deref())
    }

    /// The body, if [`read_body`](Self::read_body) has consumed one.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The body decoded as a form, when it was sent as one.
    pub fn form(&self) -> Option<QueryParams> {
        let is_form = self
            .get_header("Content-Type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if !is_form {
            return None;
        }
        self.body().map(parse_form)
    }

    /// Check that the request is addressed to this server.
    pub fn validate_host(&self, server_name: &str, port: u16) -> Result<(), Error> {
        validate_host(&self.headers, server_name, port)
    }
}

/// Split a request line into method, target and version.
///
/// The line must hold exactly three whitespace-separated tokens, and the
/// version is checked only after all three are extracted.
pub fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(line.to_string()));
    };

    let method = Method::from_str(method)?;
    let version = HttpVersion::from_str(version)?;

    Ok((method, target.to_string(), version))
}

/// Read and parse the header block that follows the request line.
pub async fn parse_headers<R>(reader: &mut R, limits: ParseLimits) -> Result<Headers, Error>
where
    R: AsyncBufRead + Unpin,
{
    let lines = read_header_lines(reader, limits.max_line_len, limits.max_headers).await?;
    Headers::parse(&lines)
}

/// Require a `Host` header naming this server, bare or with its port.
pub fn validate_host(headers: &Headers, server_name: &str, port: u16) -> Result<(), Error> {
    let host = headers.get("Host").ok_or(Error::MissingHost)?;

    if host == server_name || host == format!("{server_name}:{port}") {
        Ok(())
    } else {
        Err(Error::UnknownHost(host.to_string()))
    }
}

/// Read a request line and header block from a connection.
///
/// The body is left unread on the stream; see [`HttpRequest::read_body`].
pub async fn parse_request<R>(reader: &mut R, limits: ParseLimits) -> Result<HttpRequest, Error>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader, limits.max_line_len)
        .await?
        .ok_or(Error::EmptyRequest)?;

    let (method, target, version) = parse_request_line(&line)?;
    let headers = parse_headers(reader, limits).await?;

    Ok(HttpRequest::new(method, target, version, headers))
}

fn parse_target(target: &str, host: &str) -> Result<Url, String> {
    if let Some(pos) = target.find(|c: char| c.is_control()) {
        return Err(format!("control character at offset {pos}"));
    }

    let bytes = target.as_bytes();
    for (i, _) in target.match_indices('%') {
        let well_formed = bytes.get(i + 1..i + 3).is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(format!("bad percent-encoding at offset {i}"));
        }
    }

    let base = Url::parse(&format!("http://{host}/")).map_err(|e| format!("bad host {host:?}: {e}"))?;
    Url::options()
        .base_url(Some(&base))
        .parse(target)
        .map_err(|e| e.to_string())
}

fn parse_form(input: &[u8]) -> QueryParams {
    let mut params = QueryParams::new();
    for (name, value) in url::form_urlencoded::parse(input) {
        if value.is_empty() {
            continue;
        }
        params.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    params
}
