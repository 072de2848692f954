//! Shared test fixture: an in-process mock of the remote drive API.
//!
//! Accepts any number of concurrent connections, routes by method and
//! path, and records every request for assertions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Behavior knobs for [`MockDrive`].
#[derive(Debug, Clone)]
pub struct MockDriveConfig {
    /// Respond 500 to this part number.
    pub fail_part: Option<u64>,
    /// Delay the response to this part number so it completes last.
    pub delay_part: Option<u64>,
    /// Status for `POST /api/files` (folder create / file commit).
    pub commit_status: u16,
    /// Status for `DELETE /api/uploads/{id}`.
    pub cleanup_status: u16,
    /// User id returned by the session endpoint.
    pub session_user: i64,
}

impl Default for MockDriveConfig {
    fn default() -> Self {
        Self {
            fail_part: None,
            delay_part: None,
            commit_status: 200,
            cleanup_status: 200,
            session_user: 42,
        }
    }
}

/// One recorded request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string.
    pub target: String,
    /// Body decoded as text (lossy for binary chunks).
    pub body: String,
    /// Raw body length in bytes.
    pub body_len: usize,
}

/// The mock server. Shuts down when dropped.
pub struct MockDrive {
    pub url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: JoinHandle<()>,
}

impl Drop for MockDrive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl MockDrive {
    pub async fn start(config: MockDriveConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(handle_connection(
                    stream,
                    config.clone(),
                    Arc::clone(&recorded),
                ));
            }
        });

        Self {
            url,
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of recorded requests matching method and target prefix.
    pub fn count(&self, method: &str, target_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.target.starts_with(target_prefix))
            .count()
    }

    /// First recorded request matching method and target prefix.
    pub fn find(&self, method: &str, target_prefix: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .find(|r| r.method == method && r.target.starts_with(target_prefix))
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    config: MockDriveConfig,
    recorded: Arc<Mutex<Vec<Recorded>>>,
) {
    let raw = read_full_request(&mut stream).await;
    let head = String::from_utf8_lossy(&raw);
    let Some(head_end) = head.find("\r\n\r\n") else {
        return;
    };
    let request_line = head.lines().next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let body_bytes = &raw[head_end + 4..];
    let body = String::from_utf8_lossy(body_bytes).into_owned();
    let body_len = body_bytes.len();

    recorded.lock().unwrap().push(Recorded {
        method: method.clone(),
        target: target.clone(),
        body: body.clone(),
        body_len,
    });

    let (status, resp_body) = route(&method, &target, &body, body_len, &config).await;

    let resp = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        resp_body.len(),
        resp_body
    );
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn route(
    method: &str,
    target: &str,
    body: &str,
    body_len: usize,
    config: &MockDriveConfig,
) -> (u16, String) {
    if method == "GET" && target.starts_with("/api/auth/session") {
        return (
            200,
            format!(
                r#"{{"userName":"u","userId":{},"hash":"h"}}"#,
                config.session_user
            ),
        );
    }

    if method == "GET" && target.starts_with("/api/files") && target.contains("operation=find") {
        return (
            200,
            r#"{"items":[{"id":"root-1","name":"root","type":"folder"}]}"#.into(),
        );
    }

    if method == "GET" && target.starts_with("/api/files") && target.contains("operation=list") {
        return (
            200,
            r#"{"items":[
                {"id":"f1","name":"docs","type":"folder"},
                {"id":"f2","name":"notes.txt","type":"file","size":12,
                 "updatedAt":"2025-11-03T10:30:00Z"}
            ],"meta":{"count":2}}"#
                .into(),
        );
    }

    if method == "POST" && target.starts_with("/api/uploads/") {
        let part_no = query_param(target, "partNo")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        if config.delay_part == Some(part_no) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if config.fail_part == Some(part_no) {
            return (500, "chunk store failed".into());
        }
        return (
            200,
            format!(
                r#"{{"partId":{},"partNo":{},"size":{},"salt":"s{}"}}"#,
                1000 + part_no,
                part_no,
                body_len,
                part_no
            ),
        );
    }

    if method == "DELETE" && target.starts_with("/api/uploads/") {
        return (config.cleanup_status, "{}".into());
    }

    if method == "POST" && target == "/api/files" {
        if config.commit_status != 200 {
            return (config.commit_status, "commit rejected".into());
        }
        // Echo the created object back from the request body.
        let v: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
        let name = v["name"].as_str().unwrap_or("unnamed");
        let kind = v["type"].as_str().unwrap_or("file");
        let size = v["size"].as_i64().unwrap_or(0);
        return (
            200,
            format!(
                r#"{{"id":"new-1","name":"{name}","type":"{kind}","size":{size},
                     "updatedAt":"2025-11-03T10:30:00Z"}}"#
            ),
        );
    }

    if method == "POST" && (target == "/api/files/move" || target == "/api/files/delete") {
        return (200, "{}".into());
    }

    if method == "POST" && target.ends_with("/copy") {
        return (
            200,
            r#"{"id":"copy-1","name":"notes.txt","type":"file","size":12,
                "updatedAt":"2025-11-03T10:30:00Z"}"#
                .into(),
        );
    }

    if method == "PATCH" && target.starts_with("/api/files/") {
        return (200, "{}".into());
    }

    (404, "not found".into())
}

fn query_param(target: &str, key: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query.split('&').find_map(|kv| {
        let (k, v) = kv.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

/// Reads one full HTTP request (headers plus declared body).
async fn read_full_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 8192];
    loop {
        let n = stream.read(&mut tmp).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);

        let text = String::from_utf8_lossy(&buf);
        let Some(head_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..head_end]
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + content_length {
            break;
        }
    }
    buf
}
