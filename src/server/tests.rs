//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use crate::parser::{parse_response, Method, ParseLimits, ParsedResponse};
    use crate::server::http_server::ACCEPT_BACKOFF;
    use crate::server::{
        Error, HttpFault, HttpResponse, HttpServer, Representation, Route, Router, ServerConfig,
        StatusCode, UserStore,
    };

    // Mock TcpStream for testing
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Vec<u8>,
    }

    impl MockTcpStream {
        fn new(read_data: Vec<u8>) -> Self {
            Self {
                read_data: Cursor::new(read_data),
                write_data: Vec::new(),
            }
        }

        fn written_data(&self) -> &[u8] {
            &self.write_data
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            let this = self.get_mut();
            this.write_data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    // A peer that resets the connection on every read and write.
    struct ResetStream;

    impl AsyncRead for ResetStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    impl AsyncWrite for ResetStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig::new("127.0.0.1", 8080, "example.com")
    }

    /// Run one request through a connection and read back the response.
    async fn send(router: &Arc<Router>, request: &[u8]) -> ParsedResponse {
        send_with(router, &test_config(), request).await
    }

    async fn send_with(router: &Arc<Router>, config: &ServerConfig, request: &[u8]) -> ParsedResponse {
        let mut stream = MockTcpStream::new(request.to_vec());
        let result = HttpServer::handle_connection(&mut stream, router.clone(), config, 8080).await;
        assert!(result.is_ok(), "connection failed: {result:?}");

        let mut written = stream.written_data();
        parse_response(&mut written, ParseLimits::default()).await.unwrap()
    }

    fn body_text(response: &ParsedResponse) -> String {
        String::from_utf8(response.body.clone().unwrap_or_default()).unwrap()
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = HttpServer::new(test_config());
        assert_eq!(server.config.host, "127.0.0.1");
        assert_eq!(server.config.port, 8080);
        assert_eq!(server.config.server_name, "example.com");
        assert_eq!(server.config.max_line_len, 64 * 1024);
        assert_eq!(server.config.max_headers, 100);
        assert_eq!(server.config.max_body_len, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_post_then_get_returns_created_user() {
        let router = Arc::new(Router::new());

        let created = send(&router, b"POST /users?name=Ann&age=30 HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(created.status, 204);
        assert_eq!(created.body, None);
        assert_eq!(created.headers.get("Content-Length"), None);

        let fetched = send(
            &router,
            b"GET /users/1 HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n",
        )
        .await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.headers.get("Content-Type"), Some("application/json; charset=utf-8"));
        let user: serde_json::Value = serde_json::from_slice(fetched.body.as_deref().unwrap()).unwrap();
        assert_eq!(user, serde_json::json!({"id": 1, "name": "Ann", "age": "30"}));
    }

    #[tokio::test]
    async fn test_list_users_as_json_is_keyed_by_id() {
        let router = Arc::new(Router::new());
        send(&router, b"POST /users?name=Ann&age=30 HTTP/1.1\r\nHost: example.com:8080\r\n\r\n").await;

        let listed = send(
            &router,
            b"GET /users HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n",
        )
        .await;
        assert_eq!(listed.status, 200);
        assert_eq!(body_text(&listed), r#"{"1":{"id":1,"name":"Ann","age":"30"}}"#);
        assert_eq!(listed.headers.get("Content-Length"), Some("38"));
    }

    #[tokio::test]
    async fn test_list_users_as_html_escapes_values() {
        let router = Arc::new(Router::new());
        send(&router, b"POST /users?name=%3Cb%3EBo&age=41 HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        send(&router, b"POST /users?name=Cy&age=7 HTTP/1.1\r\nHost: example.com\r\n\r\n").await;

        let listed = send(
            &router,
            b"GET /users HTTP/1.1\r\nHost: example.com\r\nAccept: text/html,application/xhtml+xml\r\n\r\n",
        )
        .await;
        assert_eq!(listed.status, 200);
        assert_eq!(listed.headers.get("Content-Type"), Some("text/html; charset=utf-8"));
        let html = body_text(&listed);
        assert!(html.contains("<div>Users (2)</div>"));
        assert!(html.contains("<li>#1 &lt;b&gt;Bo, 41</li><li>#2 Cy, 7</li>"));
    }

    #[tokio::test]
    async fn test_content_length_counts_utf8_bytes() {
        let router = Arc::new(Router::new());
        // "Анна" percent-encoded as UTF-8.
        send(
            &router,
            b"POST /users?name=%D0%90%D0%BD%D0%BD%D0%B0&age=30 HTTP/1.1\r\nHost: example.com\r\n\r\n",
        )
        .await;

        let fetched = send(
            &router,
            b"GET /users/1 HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n",
        )
        .await;
        let body = fetched.body.clone().unwrap();
        assert_eq!(fetched.headers.get("Content-Length"), Some(body.len().to_string().as_str()));
        assert!(body.len() > body_text(&fetched).chars().count());
        assert!(body_text(&fetched).contains("Анна"));
    }

    #[tokio::test]
    async fn test_post_with_form_body() {
        let router = Arc::new(Router::new());
        let created = send(
            &router,
            b"POST /users?name=Dee HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 6\r\n\r\nage=52",
        )
        .await;
        assert_eq!(created.status, 204);

        let fetched = send(
            &router,
            b"GET /users/1 HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n",
        )
        .await;
        assert_eq!(body_text(&fetched), r#"{"id":1,"name":"Dee","age":"52"}"#);
    }

    #[tokio::test]
    async fn test_post_missing_field() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"POST /users?name=Ann HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), "Missing required field: age");
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let router = Arc::new(Router::new());
        for accept in ["application/json", "text/html"] {
            let request = format!("GET /users/999 HTTP/1.1\r\nHost: example.com\r\nAccept: {accept}\r\n\r\n");
            let response = send(&router, request.as_bytes()).await;
            assert_eq!(response.status, 404, "Accept: {accept}");
        }
    }

    #[tokio::test]
    async fn test_unacceptable_accept_precedes_missing_user() {
        let router = Arc::new(Router::new());
        let response = send(
            &router,
            b"GET /users/999 HTTP/1.1\r\nHost: example.com\r\nAccept: text/plain\r\n\r\n",
        )
        .await;
        assert_eq!(response.status, 406);
    }

    #[tokio::test]
    async fn test_missing_accept_is_not_acceptable() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /users HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 406);
        assert_eq!(response.reason, "Not Acceptable");
    }

    #[tokio::test]
    async fn test_missing_host_header() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /users HTTP/1.1\r\nAccept: application/json\r\n\r\n").await;
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), "Host header is missing");
    }

    #[tokio::test]
    async fn test_unknown_host() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /users HTTP/1.1\r\nHost: other.org\r\n\r\n").await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /users HTTP/1.0\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 505);
        assert_eq!(response.reason, "HTTP Version Not Supported");
    }

    #[tokio::test]
    async fn test_malformed_request_line() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /users HTTP/1.1 extra\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), "Malformed request line");
    }

    #[tokio::test]
    async fn test_too_many_headers() {
        let router = Arc::new(Router::new());
        let mut request = String::from("GET /users HTTP/1.1\r\nHost: example.com\r\n");
        for i in 0..100 {
            request.push_str(&format!("X-Filler-{i}: x\r\n"));
        }
        request.push_str("\r\n");

        let response = send(&router, request.as_bytes()).await;
        assert_eq!(response.status, 494);
        assert_eq!(body_text(&response), "Too many headers");
    }

    #[tokio::test]
    async fn test_request_line_too_long() {
        let router = Arc::new(Router::new());
        let config = ServerConfig { max_line_len: 24, ..test_config() };
        let response = send_with(
            &router,
            &config,
            b"GET /users/this-path-does-not-fit HTTP/1.1\r\nHost: example.com\r\n\r\n",
        )
        .await;
        assert_eq!(response.status, 400);
        assert_eq!(response.reason, "Bad Request");
        assert_eq!(body_text(&response), "Request line is too long");
    }

    #[tokio::test]
    async fn test_header_line_too_long() {
        let router = Arc::new(Router::new());
        let config = ServerConfig { max_line_len: 24, ..test_config() };
        let response = send_with(
            &router,
            &config,
            b"GET /users HTTP/1.1\r\nHost: example.com\r\nX-Padding: aaaaaaaaaaaaaaaaaaaaaaaa\r\n\r\n",
        )
        .await;
        assert_eq!(response.status, 494);
        assert_eq!(response.reason, "Request Header Too Large");
        assert_eq!(body_text(&response), "Header line is too long");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_unread() {
        let router = Arc::new(Router::new());
        let config = ServerConfig { max_body_len: 8, ..test_config() };
        let response = send_with(
            &router,
            &config,
            b"POST /users?name=Ann&age=30 HTTP/1.1\r\nHost: example.com\r\nContent-Length: 9\r\n\r\n123456789",
        )
        .await;
        assert_eq!(response.status, 413);
        assert_eq!(body_text(&response), "Request body is too large");

        // Nothing was stored.
        let listed = send(&router, b"GET /users HTTP/1.1\r\nHost: example.com\r\nAccept: application/json\r\n\r\n").await;
        assert_eq!(body_text(&listed), "{}");
    }

    #[tokio::test]
    async fn test_accept_error_backs_off_without_stopping() {
        let started = tokio::time::Instant::now();
        // Returns unit: no accept error ends the loop, broken pipe included.
        let () = HttpServer::handle_accept_error(io::Error::from(io::ErrorKind::BrokenPipe)).await;
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"GET /nonexistent HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"DELETE /users HTTP/1.1\r\nHost: example.com\r\n\r\n").await;
        assert_eq!(response.status, 405);
        assert_eq!(response.headers.get("Allow"), Some("GET, POST"));
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let router = Arc::new(Router::new());
        let response = send(
            &router,
            b"POST /users?name=Ann&age=30 HTTP/1.1\r\nHost: example.com\r\nContent-Length: 50\r\n\r\nshort",
        )
        .await;
        assert_eq!(response.status, 400);
        assert_eq!(body_text(&response), "Request body is truncated");
    }

    #[tokio::test]
    async fn test_error_responses_carry_content_length() {
        let router = Arc::new(Router::new());
        let response = send(&router, b"BROKEN\r\n\r\n").await;
        let body = response.body.clone().unwrap();
        assert_eq!(response.headers.get("Content-Length"), Some(body.len().to_string().as_str()));
    }

    #[tokio::test]
    async fn test_empty_connection_gets_no_response() {
        let router = Arc::new(Router::new());
        let mut stream = MockTcpStream::new(Vec::new());
        let result = HttpServer::handle_connection(&mut stream, router, &test_config(), 8080).await;
        assert!(result.is_ok());
        assert!(stream.written_data().is_empty());
    }

    #[tokio::test]
    async fn test_connection_reset_is_absorbed() {
        let router = Arc::new(Router::new());
        let mut stream = ResetStream;
        let result = HttpServer::handle_connection(&mut stream, router, &test_config(), 8080).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_response_round_trip() {
        let response = HttpResponse::new(StatusCode::Ok)
            .with_header("X-First", "1")
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2")
            .with_content_type("text/plain")
            .with_body_bytes(b"\x00binary\xffbody".to_vec());

        let bytes = response.to_bytes();
        let mut wire = bytes.as_slice();
        let parsed = parse_response(&mut wire, ParseLimits::default()).await.unwrap();

        assert_eq!(parsed.status, 200);
        assert_eq!(parsed.reason, "OK");
        let headers: Vec<(String, String)> = parsed
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(headers, response.headers);
        assert_eq!(parsed.body, response.body);
    }

    #[test]
    fn test_response_wire_format() {
        let response = HttpResponse::new(StatusCode::NotFound).with_body_string("gone");
        assert_eq!(
            response.to_bytes(),
            b"HTTP/1.1 404 Not Found\r\nServer: userhttp\r\nContent-Length: 4\r\n\r\ngone".to_vec()
        );
    }

    #[test]
    fn test_header_text_is_single_byte_encoded() {
        let response = HttpResponse::new(StatusCode::Ok).with_header("X-Name", "café ☃");
        let bytes = response.to_bytes();
        let expected: &[u8] = b"X-Name: caf\xe9 ?\r\n";
        assert!(bytes.windows(expected.len()).any(|w| w == expected));
    }

    #[test]
    fn test_internal_fault_does_not_leak_details() {
        let err = Error::InternalError("database password is hunter2".to_string());
        let response = HttpFault::from(&err).into_response();
        assert_eq!(response.status, StatusCode::InternalServerError);
        assert_eq!(response.body.as_deref(), Some(&b"Internal Server Error"[..]));
        assert_eq!(response.get_header("Content-Length"), Some("21"));
    }

    #[test]
    fn test_route_resolution() {
        assert_eq!(Route::resolve(&Method::POST, "/users").unwrap(), Route::CreateUser);
        assert_eq!(Route::resolve(&Method::GET, "/users").unwrap(), Route::ListUsers);
        assert_eq!(Route::resolve(&Method::GET, "/users/42").unwrap(), Route::GetUser("42".to_string()));
        assert!(matches!(Route::resolve(&Method::GET, "/users/4a"), Err(Error::RouteNotFound(_))));
        assert!(matches!(Route::resolve(&Method::GET, "/users/"), Err(Error::RouteNotFound(_))));
        assert!(matches!(Route::resolve(&Method::GET, "/"), Err(Error::RouteNotFound(_))));
        assert!(matches!(
            Route::resolve(&Method::POST, "/users/1"),
            Err(Error::MethodNotAllowed { ref allowed, .. }) if allowed == &vec![Method::GET]
        ));
    }

    #[test]
    fn test_negotiation() {
        assert_eq!(Representation::negotiate(["text/html"]).unwrap(), Representation::Html);
        assert_eq!(Representation::negotiate(["application/json"]).unwrap(), Representation::Json);
        assert_eq!(
            Representation::negotiate(["application/json", "text/html;q=0.9"]).unwrap(),
            Representation::Html
        );
        assert!(matches!(Representation::negotiate(["*/*"]), Err(Error::NotAcceptable(_))));
        assert!(matches!(Representation::negotiate(Vec::<&str>::new()), Err(Error::NotAcceptable(_))));
    }

    #[test]
    fn test_user_ids_are_sequential() {
        let mut store = UserStore::new();
        assert_eq!(store.insert("Ann", "30").id, 1);
        assert_eq!(store.insert("Bo", "not a number").id, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().age, "not a number");
        assert!(store.get(3).is_none());
    }
}
