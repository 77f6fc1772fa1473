//! Minimal HTTP/1.1 JSON transport.
//!
//! Opens a fresh TCP connection per request and drives it with hyper's
//! low-level client connection.

use std::time::Duration;

use anyhow::{Context, bail};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST, USER_AGENT};
use http::Method;
use http_body_util::{BodyExt, Full};
use tracing::debug;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends JSON requests to a single `host:port`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    address: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `host:port`.
    ///
    /// `host` may carry an `http://` prefix. TLS endpoints are rejected.
    pub fn new(host: &str, port: u16) -> anyhow::Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.starts_with("https://") {
            bail!("https endpoints are not supported: {host}");
        }
        let host = host.strip_prefix("http://").unwrap_or(host);
        if host.is_empty() {
            bail!("host is required");
        }
        if host.contains(':') {
            bail!("host must not include a port, use --port instead: {host}");
        }
        Ok(Self {
            address: format!("{host}:{port}"),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Bytes> {
        self.send(Method::GET, path, None).await
    }

    pub async fn put(&self, path: &str, body: &serde_json::Value) -> anyhow::Result<Bytes> {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx responses become errors carrying the status and body text.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> anyhow::Result<Bytes> {
        let payload = match body {
            Some(value) => Bytes::from(serde_json::to_vec(value)?),
            None => Bytes::new(),
        };

        let result = tokio::time::timeout(self.timeout, async {
            let stream = tokio::net::TcpStream::connect(&self.address)
                .await
                .with_context(|| format!("failed to connect to {}", self.address))?;

            let io = hyper_util::rt::TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .with_context(|| format!("http handshake with {} failed", self.address))?;

            // Drive the connection in the background.
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    debug!(error = %e, "connection closed with error");
                }
            });

            let req = http::Request::builder()
                .method(method.clone())
                .uri(path)
                .header(HOST, &self.address)
                .header(USER_AGENT, concat!("escale/", env!("CARGO_PKG_VERSION")))
                .header(CONTENT_TYPE, "application/json")
                .body(Full::new(payload))?;

            debug!(%method, %path, address = %self.address, "sending request");
            let resp = sender
                .send_request(req)
                .await
                .with_context(|| format!("{method} {path} failed"))?;

            let status = resp.status();
            let bytes = resp.into_body().collect().await?.to_bytes();
            if !status.is_success() {
                bail!(
                    "{method} {path} returned {status}: {}",
                    String::from_utf8_lossy(&bytes)
                );
            }
            Ok::<_, anyhow::Error>(bytes)
        })
        .await;

        match result {
            Ok(response) => response,
            Err(_) => bail!("{method} {path} timed out after {:?}", self.timeout),
        }
    }
}
