//! HTTP server implementation for userhttp.
//!
//! Accepts connections one at a time, runs each request through the
//! router and writes back either the handler's response or a translated
//! error response.

mod response;
mod config;
mod error;
mod fault;
mod http_server;
mod negotiate;
mod router;
mod tests;
mod users;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use fault::HttpFault;
pub use http_server::HttpServer;
pub use negotiate::Representation;
pub use router::{Route, Router};
pub use users::{User, UserStore};
