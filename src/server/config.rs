//! Server configuration.

use crate::parser::{ParseLimits, MAX_BODY, MAX_HEADERS, MAX_LINE};

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host or address to bind to.
    pub host: String,
    /// Port to bind to; 0 picks a free one.
    pub port: u16,
    /// The virtual host name requests must address in `Host`.
    pub server_name: String,
    /// Longest request line or header line, terminator excluded.
    pub max_line_len: usize,
    /// Most header lines per request.
    pub max_headers: usize,
    /// Largest request body, in bytes.
    pub max_body_len: usize,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, server_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            server_name: server_name.into(),
            ..Self::default()
        }
    }

    pub fn limits(&self) -> ParseLimits {
        ParseLimits {
            max_line_len: self.max_line_len,
            max_headers: self.max_headers,
            max_body_len: self.max_body_len,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            server_name: "localhost".to_string(),
            max_line_len: MAX_LINE,
            max_headers: MAX_HEADERS,
            max_body_len: MAX_BODY,
        }
    }
}
