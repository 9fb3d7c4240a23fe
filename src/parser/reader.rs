//! Size-limited line reading from a buffered connection.
//!
//! Lines are decoded as ISO-8859-1, so every byte maps to exactly one
//! `char` and no input is rejected for its encoding.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::parser::error::Error;

/// Longest accepted request line or header line, terminator excluded.
pub const MAX_LINE: usize = 64 * 1024;

/// Most header lines accepted in one message.
pub const MAX_HEADERS: usize = 100;

/// Largest request body accepted, in bytes.
pub const MAX_BODY: usize = 1024 * 1024;

/// Read one line, returning it without its terminator.
///
/// CRLF is the terminator; a bare LF is tolerated. Returns `Ok(None)` when
/// the stream is already at EOF. A line whose content exceeds `max_len`
/// bytes fails with [`Error::LineTooLong`] as soon as that is known, so at
/// most one buffer beyond the limit is ever held.
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> Result<Option<String>, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut saw_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            break;
        }
        saw_any = true;

        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                line.extend_from_slice(&available[..i]);
                reader.consume(i + 1);
                break;
            }
            None => {
                let n = available.len();
                line.extend_from_slice(available);
                reader.consume(n);
            }
        }

        // One extra byte of slack for a '\r' still waiting on its '\n'.
        if line.len() > max_len + 1 {
            return Err(Error::LineTooLong(max_len));
        }
    }

    if !saw_any {
        return Ok(None);
    }

    if line.last() == Some(&b'\r') {
        line.pop();
    }
    if line.len() > max_len {
        return Err(Error::LineTooLong(max_len));
    }

    Ok(Some(decode_latin1(&line)))
}

/// Read raw header lines up to the blank line that ends the header block.
///
/// The blank line is consumed but not returned. EOF also ends the block.
/// The count ceiling is checked as each line is added, so the 101st line of
/// a flood fails before anything after it is read.
pub async fn read_header_lines<R>(
    reader: &mut R,
    max_len: usize,
    max_headers: usize,
) -> Result<Vec<String>, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();

    loop {
        let line = match read_line(reader, max_len).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(Error::LineTooLong(limit)) => return Err(Error::HeaderLineTooLong(limit)),
            Err(e) => return Err(e),
        };

        if line.is_empty() {
            break;
        }

        lines.push(line);
        if lines.len() > max_headers {
            return Err(Error::TooManyHeaders(max_headers));
        }
    }

    Ok(lines)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
