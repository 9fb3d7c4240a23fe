//! A hand-rolled HTTP/1.1 server with a tiny in-memory users API.
//!
//! Requests are read straight off a TCP stream: the request line and
//! headers are parsed under hard size limits, the `Host` header is checked
//! against a single virtual host name, and the request is dispatched to a
//! fixed route table. Every failure along the way becomes a well-formed
//! HTTP error response.
//!
//! # Routes
//!
//! - `POST /users?name=<name>&age=<age>` stores a user and answers `204`.
//! - `GET /users` lists users as HTML or JSON, chosen by `Accept`.
//! - `GET /users/<id>` shows one user, or `404`.
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use userhttp::{parse_request, Method, ParseLimits};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut wire: &[u8] = b"GET /users?name=Ann HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = parse_request(&mut wire, ParseLimits::default()).await.unwrap();
//!
//! assert_eq!(request.method(), &Method::GET);
//! assert_eq!(request.path().unwrap(), "/users");
//! assert_eq!(request.get_query_param("name").unwrap(), Some("Ann"));
//! # }
//! ```
//!
//! ## Running the server
//!
//! ```no_run
//! use userhttp::{HttpServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = HttpServer::new(ServerConfig::new("127.0.0.1", 8080, "example.com"));
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{parse_request, Error as ParserError, Headers, HttpRequest, HttpVersion, Method, ParseLimits};
pub use server::{Error as ServerError, HttpFault, HttpResponse, HttpServer, Router, ServerConfig, StatusCode};
