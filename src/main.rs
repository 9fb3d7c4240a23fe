//! Command-line entry point: `userhttp <host> <port> <server-name>`.

use clap::Parser;
use log::error;

use userhttp::parser::{MAX_BODY, MAX_HEADERS, MAX_LINE};
use userhttp::{HttpServer, ServerConfig};

/// Serve the users API on a single virtual host.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Host or address to bind to
    host: String,

    /// Port to bind to
    port: u16,

    /// Name clients must send in the Host header
    server_name: String,

    /// Longest accepted request or header line, in bytes
    #[arg(long, default_value_t = MAX_LINE)]
    max_line_len: usize,

    /// Most header lines accepted per request
    #[arg(long, default_value_t = MAX_HEADERS)]
    max_headers: usize,

    /// Largest accepted request body, in bytes
    #[arg(long, default_value_t = MAX_BODY)]
    max_body_len: usize,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        server_name: args.server_name,
        max_line_len: args.max_line_len,
        max_headers: args.max_headers,
        max_body_len: args.max_body_len,
    };

    let server = HttpServer::new(config);
    if let Err(e) = server.start().await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}
