//! 本地 HTTP 测试服务器
//!
//! Answers each connection with the next scripted response and records the
//! requests it saw, so client code can run against `http://127.0.0.1:{port}`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::clients::arm::ArmClient;
use crate::credentials::StaticTokenCredential;
use crate::lro::PollOptions;

/// One scripted HTTP response.
#[derive(Debug, Clone)]
pub(crate) struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status)
            .header("Content-Type", "application/json")
            .body(body.to_string())
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    fn encode(&self) -> String {
        let mut out = format!("HTTP/1.1 {} Mock\r\n", self.status);
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.body.len(),
            self.body
        ));
        out
    }
}

/// A request as seen by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    /// Path and query.
    pub target: String,
    pub body: String,
}

impl RecordedRequest {
    /// `"GET /path"` without the query.
    pub fn line(&self) -> String {
        let path = self.target.split('?').next().unwrap_or_default();
        format!("{} {path}", self.method)
    }
}

pub(crate) struct MockServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Binds to a free port and serves `script(base_url)` in order.
    /// Requests past the end of the script get a 500.
    pub async fn start<F>(script: F) -> Option<Self>
    where
        F: FnOnce(&str) -> Vec<MockResponse>,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
        let base_url = format!("http://{}", listener.local_addr().ok()?);
        let responses: VecDeque<MockResponse> = script(&base_url).into();
        let requests = Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(serve(listener, responses, Arc::clone(&requests)));
        Some(Self { base_url, requests })
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// `METHOD /path` of every request, in order.
    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::line).collect()
    }

    /// Client for subscription `sub-1` against this server, polling every millisecond.
    pub fn client(&self) -> Option<ArmClient> {
        ArmClient::builder("sub-1")
            .endpoint(self.base_url.clone())
            .credential(Arc::new(StaticTokenCredential::new("token")))
            .poll_options(PollOptions {
                interval: Duration::from_millis(1),
                max_interval: Duration::from_millis(5),
                max_attempts: 10,
                timeout: Duration::from_secs(5),
            })
            .build()
            .ok()
    }
}

async fn serve(
    listener: TcpListener,
    mut responses: VecDeque<MockResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    while let Ok((mut stream, _)) = listener.accept().await {
        let Some(request) = read_request(&mut stream).await else {
            continue;
        };
        if let Ok(mut seen) = requests.lock() {
            seen.push(request);
        }
        let response = responses.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                500,
                serde_json::json!({ "error": { "code": "Unscripted", "message": "no response left" } }),
            )
        });
        let _ = stream.write_all(response.encode().as_bytes()).await;
        let _ = stream.shutdown().await;
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        target,
        body,
    })
}
