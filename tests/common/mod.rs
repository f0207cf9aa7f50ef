//! Loopback HTTP backend for integration tests.
//!
//! Every accepted connection serves exactly one request: the request is
//! recorded, handed to the test's handler, and answered with the canned
//! response it returns (after an optional delay), then the connection closes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
    /// Advertised `Content-Length` when it differs from the body's length.
    pub declared_len: Option<usize>,
}

impl Canned {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into(), delay: Duration::ZERO, declared_len: None }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: String::new(), delay: Duration::ZERO, declared_len: None }
    }

    pub fn reply(text: &str) -> Self {
        Self::ok_json(serde_json::json!({ "reply": text }).to_string())
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Promise more body bytes than are sent, then close the connection.
    pub fn truncated(mut self) -> Self {
        self.declared_len = Some(self.body.len() + 64);
        self
    }
}

pub struct MockBackend {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Canned + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let log = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let log = Arc::clone(&log);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    serve_one(stream, log, handler).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A loopback URL with nothing listening behind it.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn serve_one<F>(
    mut stream: TcpStream,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
    handler: Arc<F>,
) where
    F: Fn(&RecordedRequest) -> Canned + Send + Sync + 'static,
{
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let canned = (*handler)(&request);
    log.lock().unwrap().push(request);

    if !canned.delay.is_zero() {
        tokio::time::sleep(canned.delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        canned.status,
        reason(canned.status),
        canned.declared_len.unwrap_or(canned.body.len()),
        canned.body,
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some((method, path, headers, head_len)) = parse_head(&buf)? {
            let content_length = headers
                .iter()
                .find(|(k, _)| k == "content-length")
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < head_len + content_length {
                let n = stream.read(&mut chunk).await.ok()?;
                if n == 0 {
                    return None;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let body = String::from_utf8_lossy(&buf[head_len..head_len + content_length]).into_owned();
            return Some(RecordedRequest { method, path, headers, body });
        }
    }
}

type Head = (String, String, Vec<(String, String)>, usize);

/// `None` on a parse error, `Some(None)` when more bytes are needed.
fn parse_head(buf: &[u8]) -> Option<Option<Head>> {
    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut req = httparse::Request::new(&mut headers);
    match req.parse(buf).ok()? {
        httparse::Status::Partial => Some(None),
        httparse::Status::Complete(head_len) => {
            let method = req.method?.to_string();
            let path = req.path?.to_string();
            let headers = req
                .headers
                .iter()
                .map(|h| {
                    (
                        h.name.to_ascii_lowercase(),
                        String::from_utf8_lossy(h.value).into_owned(),
                    )
                })
                .collect();
            Some(Some((method, path, headers, head_len)))
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
