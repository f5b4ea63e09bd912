//! Monoio-native HTTP/HTTPS client
//!
//! - Single-threaded async with monoio
//! - Direct TLS integration with rustls and the webpki root set
//! - HTTP/1.1 with `Connection: close`; the body is read to EOF
//! - Chunked transfer decoding, redirect following, per-call timeout

use crate::errors::{ExchangeError, Result};
use crate::traits::HttpTransport;
use crate::types::HttpMethod;
use async_trait::async_trait;
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection};
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Outgoing HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// POST with an `application/x-www-form-urlencoded` body
    pub fn post_form(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body: Some(body.into()),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
        }
    }
}

/// HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }
}

/// Monoio-native HTTP(S) client
pub struct MonoioHttpsClient {
    tls_config: Arc<ClientConfig>,
    user_agent: String,
    timeout: Duration,
    max_redirects: usize,
}

impl MonoioHttpsClient {
    /// Create a client with the webpki root certificates
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let tls_config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            tls_config: Arc::new(tls_config),
            user_agent: user_agent.into(),
            timeout,
            max_redirects: MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a request, following redirects, bounded by the configured timeout
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        match monoio::time::timeout(self.timeout, self.follow_redirects(request)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout {
                secs: self.timeout.as_secs(),
                url: request.url.clone(),
            }),
        }
    }

    async fn follow_redirects(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut current = request.clone();

        for _ in 0..=self.max_redirects {
            let response = self.send_once(&current).await?;

            if !response.is_redirect() {
                return Ok(response);
            }

            let Some(location) = response.header("location") else {
                return Ok(response);
            };

            let next = Url::parse(&current.url)?.join(location)?;
            debug!("↪️  {} redirect: {} -> {}", response.status, current.url, next);

            // 301/302/303 turn a POST into a body-less GET; 307/308 replay as-is
            if matches!(response.status, 301..=303) && current.method == HttpMethod::Post {
                current.method = HttpMethod::Get;
                current.body = None;
                current.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
            }
            current.url = next.to_string();
        }

        Err(ExchangeError::Transport {
            code: None,
            message: format!("Too many redirects (max {})", self.max_redirects),
            url: request.url.clone(),
        })
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let parsed_url = Url::parse(url)?;

        let host = parsed_url
            .host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl(format!("No host in URL: {url}")))?
            .to_string();
        let tls = match parsed_url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(ExchangeError::InvalidUrl(format!("Unsupported scheme '{other}': {url}"))),
        };
        let port = parsed_url
            .port_or_known_default()
            .ok_or_else(|| ExchangeError::InvalidUrl(format!("No port for URL: {url}")))?;

        let raw_request = self.build_request(request, &parsed_url, &host);

        let tcp_stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ExchangeError::transport(&e, "TCP connect failed", url))?;

        let response_data = if tls {
            let server_name = ServerName::try_from(host.clone()).map_err(|e| ExchangeError::Transport {
                code: None,
                message: format!("Invalid server name: {e}"),
                url: url.to_string(),
            })?;
            let tls_conn = ClientConnection::new(self.tls_config.clone(), server_name).map_err(|e| {
                ExchangeError::Transport {
                    code: None,
                    message: format!("TLS setup failed: {e}"),
                    url: url.to_string(),
                }
            })?;

            let mut tls_stream = TlsStream::new(tcp_stream, tls_conn);
            tls_stream
                .write_all(raw_request.as_bytes())
                .await
                .map_err(|e| ExchangeError::transport(&e, "Write failed", url))?;
            tls_stream
                .read_to_end()
                .await
                .map_err(|e| ExchangeError::transport(&e, "Read failed", url))?
        } else {
            plain_exchange(tcp_stream, raw_request.into_bytes())
                .await
                .map_err(|e| ExchangeError::transport(&e, "Plain HTTP exchange failed", url))?
        };

        let response = parse_http_response(&response_data).map_err(|message| ExchangeError::Transport {
            code: None,
            message,
            url: url.to_string(),
        })?;

        if !response.is_success() && !response.is_redirect() {
            warn!("⚠️  HTTP {} from {} {}", response.status, request.method, url);
        }

        Ok(response)
    }

    fn build_request(&self, request: &HttpRequest, parsed_url: &Url, host: &str) -> String {
        let mut path_and_query = parsed_url.path().to_string();
        if path_and_query.is_empty() {
            path_and_query.push('/');
        }
        if let Some(query) = parsed_url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let host_header = match parsed_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let method = request.method.as_str();
        let mut raw = format!(
            "{method} {path_and_query} HTTP/1.1\r\n\
             Host: {host_header}\r\n\
             User-Agent: {}\r\n\
             Accept: application/json\r\n\
             Connection: close\r\n",
            self.user_agent
        );

        let body = request.body.as_deref().unwrap_or("");
        if request.method == HttpMethod::Post || !body.is_empty() {
            raw.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }

        for (key, value) in &request.headers {
            raw.push_str(&format!("{key}: {value}\r\n"));
        }

        raw.push_str("\r\n");
        raw.push_str(body);
        raw
    }
}

impl Default for MonoioHttpsClient {
    fn default() -> Self {
        Self::new(
            format!("Kuna API Client/{}", env!("CARGO_PKG_VERSION")),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

#[async_trait(?Send)]
impl HttpTransport for MonoioHttpsClient {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.execute(request).await
    }
}

/// Write the request over plain TCP and read until the server closes
async fn plain_exchange(mut stream: TcpStream, request: Vec<u8>) -> io::Result<Vec<u8>> {
    let (result, _) = stream.write_all(request).await;
    result?;

    let mut response = Vec::new();
    let mut buffer = vec![0u8; 4096];
    loop {
        let (result, buf) = stream.read(buffer).await;
        let n = result?;
        if n == 0 {
            break;
        }
        response.extend_from_slice(&buf[..n]);
        buffer = buf;
    }
    Ok(response)
}

/// Split a raw HTTP/1.1 response into status, headers and decoded body
pub fn parse_http_response(data: &[u8]) -> std::result::Result<HttpResponse, String> {
    if data.is_empty() {
        return Err("Empty response: connection closed without data".to_string());
    }

    let header_end = find_subsequence(data, b"\r\n\r\n")
        .ok_or_else(|| "Invalid HTTP response: no header terminator".to_string())?;

    let header_part = String::from_utf8_lossy(&data[..header_end]);
    let body_part = &data[header_end + 4..];

    let mut lines = header_part.lines();

    let status_line = lines.next().ok_or_else(|| "Empty response".to_string())?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| format!("Invalid status line: {status_line}"))?;

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let chunked = headers.iter().any(|(k, v)| {
        k.eq_ignore_ascii_case("transfer-encoding") && v.to_ascii_lowercase().contains("chunked")
    });

    let body = if chunked {
        decode_chunked(body_part)?
    } else {
        body_part.to_vec()
    };

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Decode a `Transfer-Encoding: chunked` body
pub fn decode_chunked(mut data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut decoded = Vec::with_capacity(data.len());

    loop {
        let line_end = find_subsequence(data, b"\r\n")
            .ok_or_else(|| "Invalid chunked body: missing size line".to_string())?;
        let size_line = String::from_utf8_lossy(&data[..line_end]);
        // Chunk extensions follow a ';'
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| format!("Invalid chunk size: '{size_hex}'"))?;

        data = &data[line_end + 2..];
        if size == 0 {
            break;
        }
        if data.len() < size {
            return Err(format!("Truncated chunk: expected {size} bytes, got {}", data.len()));
        }

        decoded.extend_from_slice(&data[..size]);
        data = &data[size..];
        data = data.strip_prefix(b"\r\n").unwrap_or(data);
    }

    Ok(decoded)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn tls_error(err: rustls::Error) -> io::Error {
    io::Error::other(err)
}

/// TLS stream wrapper for monoio
pub struct TlsStream {
    stream: TcpStream,
    tls_conn: ClientConnection,
    write_buf: Vec<u8>,
    handshake_complete: bool,
}

impl TlsStream {
    pub fn new(stream: TcpStream, tls_conn: ClientConnection) -> Self {
        Self {
            stream,
            tls_conn,
            write_buf: Vec::with_capacity(8192),
            handshake_complete: false,
        }
    }

    /// Push pending TLS records to the socket
    async fn flush_tls(&mut self) -> io::Result<()> {
        while self.tls_conn.wants_write() {
            self.write_buf.clear();
            let tls_bytes = self.tls_conn.write_tls(&mut self.write_buf)?;

            if tls_bytes > 0 {
                let buf = std::mem::take(&mut self.write_buf);
                let (result, buf) = self.stream.write_all(buf).await;
                self.write_buf = buf;
                result?;
            }
        }
        Ok(())
    }

    /// Read one batch of TLS records from the socket; false on EOF
    async fn fill_tls(&mut self) -> io::Result<bool> {
        let buffer = vec![0u8; 4096];
        let (result, buf) = self.stream.read(buffer).await;
        let bytes_read = result?;

        if bytes_read == 0 {
            return Ok(false);
        }

        self.tls_conn.read_tls(&mut io::Cursor::new(&buf[..bytes_read]))?;
        self.tls_conn.process_new_packets().map_err(tls_error)?;
        Ok(true)
    }

    pub async fn complete_handshake(&mut self) -> io::Result<()> {
        if self.handshake_complete {
            return Ok(());
        }

        loop {
            self.flush_tls().await?;

            if !self.tls_conn.is_handshaking() {
                self.handshake_complete = true;
                return Ok(());
            }

            if self.tls_conn.wants_read() {
                if !self.fill_tls().await? {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "Connection closed during handshake",
                    ));
                }
            } else if !self.tls_conn.wants_write() {
                return Err(io::Error::other("TLS handshake stalled"));
            }
        }
    }

    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.complete_handshake().await?;
        self.tls_conn.writer().write_all(data)?;
        self.flush_tls().await
    }

    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        self.complete_handshake().await?;

        let mut response_data = Vec::new();
        let mut plain_buf = vec![0u8; 4096];

        loop {
            match self.tls_conn.reader().read(&mut plain_buf) {
                // close_notify received
                Ok(0) => break,
                Ok(n) => {
                    response_data.extend_from_slice(&plain_buf[..n]);
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(e),
            }

            if !self.fill_tls().await? {
                break;
            }
        }

        Ok(response_data)
    }
}
