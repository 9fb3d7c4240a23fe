//! Content negotiation on the `Accept` header.

use crate::server::error::Error;

/// The representations the users API can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Html,
    Json,
}

impl Representation {
    /// Pick a representation from the `Accept` values.
    ///
    /// `text/html` wins over `application/json` when both are listed. With
    /// neither present, including no `Accept` header at all, the request is
    /// not acceptable.
    pub fn negotiate<'a, I>(accept: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let accept = accept.into_iter().collect::<Vec<&str>>().join(", ");

        if accept.contains("text/html") {
            Ok(Representation::Html)
        } else if accept.contains("application/json") {
            Ok(Representation::Json)
        } else {
            Err(Error::NotAcceptable(accept))
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Representation::Html => "text/html; charset=utf-8",
            Representation::Json => "application/json; charset=utf-8",
        }
    }
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
