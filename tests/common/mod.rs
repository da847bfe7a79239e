//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use roundrobin_proxy::config::{BackendConfig, ProxyConfig};
use roundrobin_proxy::http::{Dispatcher, HttpServer};
use roundrobin_proxy::lifecycle::Shutdown;
use roundrobin_proxy::load_balancer::build_pool;

/// A request as received by a mock backend.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    /// Request target (path and query).
    pub target: String,
    /// Header names are lowercased, in arrival order.
    pub headers: Vec<(String, String)>,
    /// Body after any chunked decoding.
    pub body: Vec<u8>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Read one request: head plus a `Content-Length` or chunked body.
async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut reader = BufReader::new(socket);
    let mut line = String::new();

    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let mut request_line = line.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let mut request = MockRequest {
        method,
        target,
        headers,
        body: Vec::new(),
    };
    let content_length = match request.header("content-length") {
        Some(value) => Some(value.parse::<usize>().ok()?),
        None => None,
    };
    let chunked = request
        .header("transfer-encoding")
        .is_some_and(|te| te.eq_ignore_ascii_case("chunked"));

    if let Some(length) = content_length {
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).await.ok()?;
        request.body = body;
    } else if chunked {
        loop {
            line.clear();
            reader.read_line(&mut line).await.ok()?;
            let size = line.trim().split(';').next()?;
            let size = usize::from_str_radix(size, 16).ok()?;
            if size == 0 {
                // Skip trailers up to the terminating blank line.
                loop {
                    line.clear();
                    if reader.read_line(&mut line).await.ok()? == 0 || line.trim().is_empty() {
                        break;
                    }
                }
                break;
            }
            let mut chunk = vec![0u8; size];
            reader.read_exact(&mut chunk).await.ok()?;
            request.body.extend_from_slice(&chunk);
            line.clear();
            reader.read_line(&mut line).await.ok()?;
        }
    }

    Some(request)
}

/// Start a mock backend that sees the whole request.
///
/// `None` from the handler drops the connection without answering.
pub async fn start_request_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<(u16, String)>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let Some((status, body)) = f(request).await else {
                            return;
                        };
                        let reason = reqwest::StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock backend whose handler only sees the request target.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<(u16, String)>> + Send + 'static,
{
    start_request_backend(move |request: MockRequest| f(request.target)).await
}

/// Start a mock backend that always answers 200 with a fixed body.
#[allow(dead_code)]
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { Some((200, response.to_string())) }).await
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub fn closed_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start the balancer in front of `backends` on an ephemeral port.
pub async fn start_proxy(backends: &[SocketAddr]) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig::new(format!("http://{}", addr)))
        .collect();
    config.timeouts.probe_secs = 2;

    let pool = build_pool(&config).unwrap();
    let server = HttpServer::new(Dispatcher::new(Arc::new(pool)), &config.timeouts);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
