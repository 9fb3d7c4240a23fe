//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use log::{debug, error, info, warn};

use crate::parser::parse_request;
use crate::server::config::ServerConfig;
use crate::server::error::{is_disconnect_kind, Error};
use crate::server::fault::HttpFault;
use crate::server::response::HttpResponse;
use crate::server::router::Router;

/// Pause after a failed accept, so a persistent error does not spin.
pub(crate) const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// An HTTP server that serves one connection at a time.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The router, which owns the user store.
    pub router: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Arc::new(Router::new()),
        }
    }

    /// Log the registered endpoints.
    fn display_server_info(&self) {
        info!("Serving virtual host {name}", name = self.config.server_name);
        info!("Registered endpoints:");
        info!("  POST /users?name=<name>&age=<age>");
        info!("  GET  /users");
        info!("  GET  /users/<id>");
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!("Server listening on http://{addr}", addr = listener.local_addr()?);
        Ok(listener)
    }

    /// Resolves on Ctrl+C. If the handler cannot be installed the server
    /// keeps running until killed.
    async fn ctrl_c() {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
            Err(e) => {
                error!("Error setting up Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    }

    /// Log an accept failure and back off before the next accept. The loop
    /// keeps running whatever the error.
    pub(crate) async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(ACCEPT_BACKOFF).await;
    }

    /// Bind, then serve until Ctrl+C.
    pub async fn start(&self) -> Result<(), Error> {
        self.display_server_info();
        let listener = self.setup_listener().await?;
        self.serve_with_shutdown(listener, Self::ctrl_c()).await
    }

    /// Serve connections from `listener` one after another until
    /// `shutdown` resolves. A connection in progress is finished first.
    pub async fn serve_with_shutdown<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let port = listener.local_addr()?.port();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => self.serve_connection(socket, addr, port).await,
                        Err(e) => Self::handle_accept_error(e).await,
                    }
                }
            }
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Drive one connection to completion, then close it.
    ///
    /// Failures are logged and never propagate to the accept loop.
    async fn serve_connection(&self, mut socket: TcpStream, addr: SocketAddr, port: u16) {
        debug!("Accepted connection from {addr}");

        if let Err(e) = Self::handle_connection(&mut socket, self.router.clone(), &self.config, port).await {
            error!("Error handling connection from {addr}: {e}");
        }

        if let Err(e) = socket.shutdown().await {
            debug!("Error closing connection from {addr}: {e}");
        }
    }

    /// Handle a single request/response cycle on a connection.
    ///
    /// Any fault is translated into an error response. A peer that has
    /// already gone away gets nothing and the cycle ends quietly. Only a
    /// failure to write the response is returned.
    pub async fn handle_connection<S>(
        stream: &mut S,
        router: Arc<Router>,
        config: &ServerConfig,
        port: u16,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(&mut *stream);

        let response = match Self::exchange(&mut reader, router, config, port).await {
            Ok(response) => response,
            Err(e) if e.is_disconnect() => {
                debug!("Peer went away: {e}");
                return Ok(());
            }
            Err(e) => {
                let fault = HttpFault::from(&e);
                if fault.is_server_error() {
                    error!("Request failed with {fault}: {e}");
                } else {
                    warn!("Request rejected with {fault}: {e}");
                }
                fault.into_response()
            }
        };

        match response.write_to(reader.get_mut()).await {
            Ok(()) => Ok(()),
            Err(e) if is_disconnect_kind(e.kind()) => {
                debug!("Peer went away before the response was written: {e}");
                Ok(())
            }
            Err(e) => Err(Error::IoError(e)),
        }
    }

    /// Parse, validate and dispatch one request.
    async fn exchange<R>(
        reader: &mut R,
        router: Arc<Router>,
        config: &ServerConfig,
        port: u16,
    ) -> Result<HttpResponse, Error>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut request = parse_request(reader, config.limits()).await?;
        request.validate_host(&config.server_name, port)?;
        request.read_body(reader, config.max_body_len).await?;

        let request_line = format!("{} {}", request.method(), request.target());

        // Handlers run in their own task so a panic becomes a 500.
        let handler = tokio::spawn(async move { router.handle(&request).await });
        let response = match handler.await {
            Ok(result) => result?,
            Err(e) => return Err(Error::InternalError(format!("handler for {request_line} failed: {e}"))),
        };

        info!("{request_line} -> {}", response.status.as_u16());
        Ok(response)
    }
}
