//! Client-side parsing of HTTP responses.

use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::reader::read_line;
use crate::parser::request::{parse_headers, ParseLimits};
use crate::parser::version::HttpVersion;

/// A response as read back off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub version: HttpVersion,
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

/// Split `HTTP/1.1 <status> <reason>` into its parts. The reason may
/// contain spaces or be empty.
pub fn parse_status_line(line: &str) -> Result<(HttpVersion, u16, String), Error> {
    let mut parts = line.splitn(3, ' ');
    let malformed = || Error::MalformedStatusLine(line.to_string());

    let version = HttpVersion::from_str(parts.next().ok_or_else(malformed)?)?;
    let status = parts
        .next()
        .filter(|code| code.len() == 3)
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..=599).contains(code))
        .ok_or_else(malformed)?;
    let reason = parts.next().unwrap_or_default().to_string();

    Ok((version, status, reason))
}

/// Read a full response: status line, headers and a `Content-Length` body.
pub async fn parse_response<R>(reader: &mut R, limits: ParseLimits) -> Result<ParsedResponse, Error>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader, limits.max_line_len)
        .await?
        .ok_or(Error::EmptyRequest)?;
    let (version, status, reason) = parse_status_line(&line)?;
    let headers = parse_headers(reader, limits).await?;

    let body = match headers.get("Content-Length") {
        None => None,
        Some(raw) => {
            let expected = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::InvalidContentLength(raw.to_string()))?;
            let mut body = Vec::new();
            (&mut *reader).take(expected as u64).read_to_end(&mut body).await?;
            if body.len() < expected {
                return Err(Error::TruncatedBody { expected });
            }
            Some(body)
        }
    };

    Ok(ParsedResponse {
        version,
        status,
        reason,
        headers,
        body,
    })
}
