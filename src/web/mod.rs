//! Config editor HTTP server
//!
//! Serves a small dashboard plus GET/POST of the raw structured config
//! document. Documents are written without validation; a broken document is
//! caught by the next resolution. Only the first process to bind the port
//! serves, every other instance quietly stays inactive.

pub mod settings;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

pub use settings::WebSettings;

use crate::constants::WEB_READ_BUFFER;
use crate::logging::EventLogger;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Upper bound on an accepted config document
pub const MAX_CONFIG_BYTES: usize = 1024 * 1024;

/// Routes understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    GetConfig,
    PostConfig,
    NotFound,
}

impl Route {
    /// Route from the request line of a raw request
    pub fn from_request(request: &[u8]) -> Self {
        let head = String::from_utf8_lossy(request);
        let mut parts = head.lines().next().unwrap_or_default().split_whitespace();

        match (parts.next(), parts.next()) {
            (Some("GET"), Some("/" | "/index.html")) => Self::Dashboard,
            (Some("GET"), Some("/api/config")) => Self::GetConfig,
            (Some("POST"), Some("/api/config")) => Self::PostConfig,
            _ => Self::NotFound,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Dashboard => "GET /",
            Self::GetConfig => "GET /api/config",
            Self::PostConfig => "POST /api/config",
            Self::NotFound => "unknown",
        }
    }
}

/// Minimal HTTP/1.1 response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: Some(content_type),
            body: body.into(),
        }
    }

    fn error(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            content_type: None,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, self.reason);
        if let Some(content_type) = self.content_type {
            out.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        out.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", self.body.len()));

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Config editor bound to its listening socket
pub struct WebConfigServer {
    listener: TcpListener,
    config_path: PathBuf,
    body_timeout: Duration,
    logger: EventLogger,
}

/// Handler for individual connections
#[derive(Clone)]
struct ConnectionHandler {
    config_path: PathBuf,
    body_timeout: Duration,
    logger: EventLogger,
}

impl WebConfigServer {
    /// Bind the editor. `Ok(None)` means another process already serves the port.
    pub async fn bind(settings: &WebSettings) -> Result<Option<Self>> {
        let addr = settings.socket_addr()?;

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                log::debug!(
                    "WebConfig: Port {} busy, skipping web server in this process ({})",
                    settings.port,
                    e
                );
                return Ok(None);
            }
        };

        Ok(Some(Self {
            listener,
            config_path: settings.config_path(),
            body_timeout: settings.body_timeout(),
            logger: EventLogger,
        }))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listening address")
    }

    /// Accept connections forever, each handled on its own task
    pub async fn serve(self) -> Result<()> {
        let address = self.local_addr()?;
        self.logger.log_startup(&address.to_string(), &self.config_path);

        let handler = ConnectionHandler {
            config_path: self.config_path.clone(),
            body_timeout: self.body_timeout,
            logger: self.logger,
        };

        loop {
            match self.listener.accept().await {
                Ok((stream, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle_connection(stream).await {
                            handler.logger.log_error(&format!("{:#}", e), Some("connection"));
                        }
                    });
                }
                Err(e) => {
                    self.logger.log_error(&format!("Accept failed: {}", e), None);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

impl ConnectionHandler {
    async fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        let request_id = Uuid::new_v4().to_string();

        let mut request = vec![0u8; WEB_READ_BUFFER];
        let read = stream
            .read(&mut request)
            .await
            .context("Failed to read from client")?;
        request.truncate(read);

        let route = Route::from_request(&request);
        let response = match route {
            Route::Dashboard => Response::ok("text/html", DASHBOARD_HTML),
            Route::GetConfig => Response::ok("application/json", self.read_config().await),
            Route::PostConfig => self.save_config(&mut stream, request, &request_id).await?,
            Route::NotFound => Response::error(404, "Not Found", "Not Found"),
        };
        self.logger.log_request(&request_id, route.name(), response.status);

        stream
            .write_all(&response.to_bytes())
            .await
            .context("Failed to write response")?;
        let _ = stream.shutdown().await;
        Ok(())
    }

    /// Raw document, or `{}` when there is none yet
    async fn read_config(&self) -> Vec<u8> {
        tokio::fs::read(&self.config_path)
            .await
            .unwrap_or_else(|_| b"{}".to_vec())
    }

    async fn save_config(
        &self,
        stream: &mut TcpStream,
        request: Vec<u8>,
        request_id: &str,
    ) -> Result<Response> {
        let Some(header_end) = find(&request, b"\r\n\r\n") else {
            return Ok(Response::error(400, "Bad Request", "Missing Body"));
        };

        let mut body = request[header_end + 4..].to_vec();
        if let Some(content_length) = content_length(&request[..header_end]) {
            if content_length > MAX_CONFIG_BYTES {
                return Ok(Response::error(413, "Payload Too Large", "Config Too Large"));
            }
            if body.len() < content_length {
                // The first read did not capture the whole body
                let already = body.len();
                body.resize(content_length, 0);
                let rest = stream.read_exact(&mut body[already..]);
                match tokio::time::timeout(self.body_timeout, rest).await {
                    Ok(read) => {
                        read.context("Failed to read request body")?;
                    }
                    Err(_) => {
                        return Ok(Response::error(408, "Request Timeout", "Body Timeout"));
                    }
                }
            }
            body.truncate(content_length);
        }

        tokio::fs::write(&self.config_path, &body)
            .await
            .with_context(|| format!("Failed to write config: {}", self.config_path.display()))?;
        self.logger.log_config_written(request_id, body.len());

        Ok(Response::ok("text/plain", "Config Updated"))
    }
}

/// Value of the `Content-Length` header, matched case-insensitively
pub fn content_length(head: &[u8]) -> Option<usize> {
    String::from_utf8_lossy(head).lines().skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Run the editor on a detached background thread with its own runtime
pub fn start_web_server(settings: WebSettings) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let logger = EventLogger;
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                logger.log_error(&format!("Failed to start runtime: {}", e), None);
                return;
            }
        };

        let result: Result<()> = runtime.block_on(async move {
            match WebConfigServer::bind(&settings).await? {
                Some(server) => server.serve().await,
                None => Ok(()),
            }
        });
        if let Err(e) = result {
            logger.log_error(&format!("{:#}", e), Some("web server"));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(Route::from_request(b"GET / HTTP/1.1\r\n\r\n"), Route::Dashboard);
        assert_eq!(Route::from_request(b"GET /index.html HTTP/1.1\r\n\r\n"), Route::Dashboard);
        assert_eq!(Route::from_request(b"GET /api/config HTTP/1.1\r\n\r\n"), Route::GetConfig);
        assert_eq!(Route::from_request(b"POST /api/config HTTP/1.1\r\n\r\n{}"), Route::PostConfig);
        assert_eq!(Route::from_request(b"DELETE /api/config HTTP/1.1\r\n\r\n"), Route::NotFound);
        assert_eq!(Route::from_request(b"GET /favicon.ico HTTP/1.1\r\n\r\n"), Route::NotFound);
        assert_eq!(Route::from_request(b""), Route::NotFound);
    }

    #[test]
    fn test_content_length_header() {
        let head = b"POST /api/config HTTP/1.1\r\nHost: x\r\ncontent-length:  17\r\n";
        assert_eq!(content_length(head), Some(17));
        assert_eq!(content_length(b"POST /api/config HTTP/1.1\r\nHost: x"), None);
        assert_eq!(content_length(b"POST / HTTP/1.1\r\nContent-Length: lots"), None);
    }

    #[test]
    fn test_response_bytes() {
        let response = Response::ok("text/plain", "Config Updated");
        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 14\r\n"));
        assert!(text.ends_with("\r\n\r\nConfig Updated"));
    }
}
