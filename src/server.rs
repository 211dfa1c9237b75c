//! TCP server, one request per connection.
//!
//! [`Server::serve`] binds a listener and accepts connections in a spawned task. Every
//! connection is handled in its own task: a single [`Request`] is read, then the [`Handler`]
//! writes the response through a [`ResponseWriter`] that owns the connection. The connection is
//! closed when the writer is dropped.
//!
//! ```no_run
//! use h1wire::{
//!     request::Request,
//!     response::{ResponseWriter, WriteError, default_headers},
//!     http::StatusCode,
//!     server::Server,
//! };
//! use tokio::net::TcpStream;
//!
//! async fn hello(mut writer: ResponseWriter<TcpStream>, _: Request) -> Result<(), WriteError> {
//!     writer.write_status_line(StatusCode::OK).await?;
//!     writer.write_headers(&default_headers(5)).await?;
//!     writer.write_body(b"hello").await?;
//!     Ok(())
//! }
//!
//! # async fn run() -> std::io::Result<()> {
//! let server = Server::serve(42069, hello).await?;
//! // ...
//! server.close().await
//! # }
//! ```
use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::{TcpListener, TcpStream, ToSocketAddrs},
    sync::Notify,
    task::JoinHandle,
};

use crate::{
    http::StatusCode,
    log::{debug, error, info, warning},
    request::{Request, request_from_reader},
    response::{ResponseWriter, WriteError, default_headers},
};

// ===== Handler =====

/// Produces the response for a parsed [`Request`].
///
/// The handler is responsible for driving the writer to completion. It is implemented for any
/// `Fn(ResponseWriter<TcpStream>, Request) -> impl Future<Output = Result<(), WriteError>>`.
pub trait Handler: Send + Sync + 'static {
    type Future: Future<Output = Result<(), WriteError>> + Send + 'static;

    fn call(&self, writer: ResponseWriter<TcpStream>, request: Request) -> Self::Future;
}

impl<F, Fut> Handler for F
where
    F: Fn(ResponseWriter<TcpStream>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WriteError>> + Send + 'static,
{
    type Future = Fut;

    #[inline]
    fn call(&self, writer: ResponseWriter<TcpStream>, request: Request) -> Self::Future {
        self(writer, request)
    }
}

/// A complete error response: status line, default headers and `message` as a plain text
/// body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Write the whole response to `writer`, which must not have written anything yet.
    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_status_line(self.status).await?;
        writer.write_headers(&default_headers(self.message.len())).await?;
        writer.write_body(self.message.as_bytes()).await?;
        Ok(())
    }
}

impl std::error::Error for HandlerError {}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

// ===== Server =====

/// Handle to a running server.
///
/// Dropping the handle stops accepting new connections, like [`Server::close`] without waiting
/// for the listener to be closed.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    accept: Option<JoinHandle<()>>,
}

#[derive(Debug, Default)]
struct Shared {
    shutdown: AtomicBool,
    notify: Notify,
}

impl Server {
    /// Listen on `port` on all interfaces and start serving with `handler`.
    ///
    /// The listener is bound to `[::]`, which also accepts IPv4 connections on dual-stack hosts.
    /// If IPv6 is not available it falls back to `0.0.0.0`. Returns as soon as the listener is
    /// bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn serve<H: Handler>(port: u16, handler: H) -> io::Result<Server> {
        let listener = match TcpListener::bind((Ipv6Addr::UNSPECIFIED, port)).await {
            Ok(ok) => ok,
            Err(err) if err.kind() != io::ErrorKind::AddrInUse => {
                debug!("failed to bind IPv6, falling back to IPv4: {err}");
                TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?
            }
            Err(err) => return Err(err),
        };
        Self::start(listener, handler)
    }

    /// Listen on `addr` and start serving with `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn bind<A, H>(addr: A, handler: H) -> io::Result<Server>
    where
        A: ToSocketAddrs,
        H: Handler,
    {
        Self::start(TcpListener::bind(addr).await?, handler)
    }

    fn start<H: Handler>(listener: TcpListener, handler: H) -> io::Result<Server> {
        let local_addr = listener.local_addr()?;
        let shared = Arc::new(Shared::default());

        let accept = tokio::spawn(listen(listener, Arc::new(handler), Arc::clone(&shared)));
        info!("listening on {local_addr}");

        Ok(Server {
            local_addr,
            shared,
            accept: Some(accept),
        })
    }

    /// Returns the address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and close the listener.
    ///
    /// Connections that are already accepted are served to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept task panicked.
    pub async fn close(mut self) -> io::Result<()> {
        self.signal_shutdown();
        if let Some(accept) = self.accept.take() {
            accept.await.map_err(io::Error::other)?;
        }
        info!("stopped listening on {}", self.local_addr);
        Ok(())
    }

    fn signal_shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if self.accept.is_some() {
            self.signal_shutdown();
        }
    }
}

async fn listen<H: Handler>(listener: TcpListener, handler: Arc<H>, shared: Arc<Shared>) {
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            () = shared.notify.notified() => break,
        };

        match accepted {
            Ok((stream, peer)) => {
                debug!("accepted connection from {peer}");
                tokio::spawn(handle(stream, Arc::clone(&handler)));
            }
            Err(err) => {
                if shared.shutdown.load(Ordering::Acquire) {
                    break;
                }
                error!("error accepting connection: {err}");
            }
        }
    }
}

async fn handle<H: Handler>(mut stream: TcpStream, handler: Arc<H>) {
    let request = match request_from_reader(&mut stream).await {
        Ok(ok) => ok,
        Err(err) => {
            debug!("bad request: {err}");
            let mut writer = ResponseWriter::new(stream);
            if let Err(err) = HandlerError::bad_request(err.to_string())
                .write_to(&mut writer)
                .await
            {
                debug!("failed to write bad request response: {err}");
            }
            if let Err(err) = writer.into_inner().shutdown().await {
                debug!("failed to shutdown connection: {err}");
            }
            return;
        }
    };

    if let Err(err) = handler.call(ResponseWriter::new(stream), request).await {
        warning!("failed to write response: {err}");
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::sync::mpsc;

    use super::*;
    use crate::body::decode_chunked;
    use crate::headers::HeaderMap;
    use crate::response::chunked_headers;

    const SUCCESS: &str = "Your request was an absolute banger.\n";

    async fn success(mut writer: ResponseWriter<TcpStream>, _: Request) -> Result<(), WriteError> {
        writer.write_status_line(StatusCode::OK).await?;
        writer.write_headers(&default_headers(SUCCESS.len())).await?;
        writer.write_body(SUCCESS.as_bytes()).await?;
        Ok(())
    }

    async fn roundtrip(addr: SocketAddr, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8(response).unwrap()
    }

    /// Split a response into status line, header fields and body.
    fn split_response(response: &str) -> (&str, HeaderMap, &str) {
        let (head, body) = response.split_once("\r\n\r\n").unwrap();
        let (status, fields) = head.split_once("\r\n").unwrap_or((head, ""));
        let mut headers = HeaderMap::new();
        for line in fields.split("\r\n").filter(|line| !line.is_empty()) {
            let (name, value) = line.split_once(": ").unwrap();
            headers.insert(name, value);
        }
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_success_response() {
        let server = Server::bind("127.0.0.1:0", success).await.unwrap();

        let response = roundtrip(server.local_addr(), b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n").await;
        let (status, headers, body) = split_response(&response);
        assert_eq!(status, "HTTP/1.1 200 OK");
        assert_eq!(headers.get("content-length"), Some(&*SUCCESS.len().to_string()));
        assert_eq!(headers.get("connection"), Some("close"));
        assert_eq!(body, SUCCESS);

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let server = Server::bind("127.0.0.1:0", success).await.unwrap();

        let response = roundtrip(server.local_addr(), b"GET /x HTTP/2.1\r\nHost: a\r\n\r\n").await;
        let (status, headers, body) = split_response(&response);
        assert_eq!(status, "HTTP/1.1 400 Bad Request");
        assert!(body.contains("HTTP Version is unsupported: 2.1"), "{body}");
        assert_eq!(headers.get("content-length"), Some(&*body.len().to_string()));

        // the server keeps serving after a bad request
        let response = roundtrip(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_receives_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handler = move |mut writer: ResponseWriter<TcpStream>, request: Request| {
            let tx = tx.clone();
            async move {
                tx.send(request.into_parts()).unwrap();
                HandlerError::internal_server_error("nope")
                    .write_to(&mut writer)
                    .await
            }
        };
        let server = Server::bind("127.0.0.1:0", handler).await.unwrap();

        let response = roundtrip(
            server.local_addr(),
            b"POST /submit HTTP/1.1\r\nHost: a\r\nContent-Length: 13\r\n\r\nhello world!\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(response.ends_with("\r\n\r\nnope"));

        let (line, headers, body) = rx.recv().await.unwrap();
        let line = line.unwrap();
        assert_eq!(line.method, crate::http::Method::POST);
        assert_eq!(line.target, "/submit");
        assert_eq!(headers.get("host"), Some("a"));
        assert_eq!(body.as_ref(), b"hello world!\n");

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_chunked_response_with_trailers() {
        async fn chunked(mut writer: ResponseWriter<TcpStream>, _: Request) -> Result<(), WriteError> {
            let mut headers = chunked_headers();
            headers.append("Trailer", "X-Content-Length");
            writer.write_status_line(StatusCode::OK).await?;
            writer.write_headers(&headers).await?;

            let mut len = 0;
            for chunk in [&b"first "[..], b"second ", b"third"] {
                len += writer.write_chunked_body(chunk).await?;
            }

            let mut trailers = HeaderMap::new();
            trailers.insert("X-Content-Length", len.to_string());
            writer.write_trailers(&trailers).await
        }

        let server = Server::bind("127.0.0.1:0", chunked).await.unwrap();

        let response = roundtrip(server.local_addr(), b"GET /stream HTTP/1.1\r\n\r\n").await;
        let (status, headers, body) = split_response(&response);
        assert_eq!(status, "HTTP/1.1 200 OK");
        assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
        assert_eq!(headers.get("trailer"), Some("X-Content-Length"));

        let (decoded, trailers) = decode_chunked(body.as_bytes()).unwrap();
        assert_eq!(decoded.as_ref(), b"first second third");
        assert_eq!(trailers.get("x-content-length"), Some("18"));

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connections_are_independent() {
        let server = Server::bind("127.0.0.1:0", success).await.unwrap();

        // a connection stuck in the middle of its request line
        let mut stalled = TcpStream::connect(server.local_addr()).await.unwrap();
        stalled.write_all(b"GET /slo").await.unwrap();

        let response = tokio::time::timeout(
            Duration::from_secs(5),
            roundtrip(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n"),
        )
        .await
        .unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        stalled.write_all(b"w HTTP/1.1\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stalled.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_stops_accepting() {
        let server = Server::bind("127.0.0.1:0", success).await.unwrap();
        let addr = server.local_addr();

        let response = roundtrip(addr, b"GET / HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        server.close().await.unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_serve_all_interfaces() {
        let server = Server::serve(0, success).await.unwrap();
        assert!(server.local_addr().ip().is_unspecified());

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, server.local_addr().port()));
        let response = roundtrip(addr, b"GET / HTTP/1.1\r\n\r\n").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_error() {
        let server = Server::bind("127.0.0.1:0", success).await.unwrap();
        let err = Server::bind(server.local_addr(), success).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        server.close().await.unwrap();
    }
}
