//! Mock FinTrack API server for testing
//!
//! A tiny HTTP/1.1 server on a background thread. Tests script responses
//! per method and path, then inspect the requests the server received
//! (headers and bodies included). Responses for a route are consumed in
//! order; the last one keeps answering once the queue is down to it.
//! Unscripted routes answer 404 `{"detail": "Not found."}`.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A scripted response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay_ms: u64,
    /// Content-Length to announce instead of the real body length
    pub declared_length: Option<usize>,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
            delay_ms: 0,
            declared_length: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "text/plain",
            delay_ms: 0,
            declared_length: None,
        }
    }

    /// DRF-style 401 for an expired or missing access token
    pub fn unauthorized() -> Self {
        Self::json(
            401,
            serde_json::json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            }),
        )
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Announce `length` bytes but close the connection after the real body
    pub fn truncated(mut self, length: usize) -> Self {
        self.declared_length = Some(length);
        self
    }
}

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Full path including query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path_without_query(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(String, String), VecDeque<MockResponse>>,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    fn next_response(&mut self, method: &str, path: &str) -> MockResponse {
        let key = (method.to_string(), path.to_string());
        match self.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

fn not_found() -> MockResponse {
    MockResponse::json(404, serde_json::json!({ "detail": "Not found." }))
}

/// Mock FinTrack API server
pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<MockState>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    /// Start a new mock server on a random available port
    pub fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(Mutex::new(MockState::default()));

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let state_clone = state.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Queue a response for `method` and `path` (query string ignored)
    pub fn respond(&self, method: &str, path: &str, response: MockResponse) -> &Self {
        let mut state = self.state.lock().unwrap();
        state
            .routes
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests received for a path (query string ignored)
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path_without_query() == path)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, state: &Mutex<MockState>) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let response = {
        let mut state = state.lock().unwrap();
        let response = state.next_response(&request.method, request.path_without_query());
        state.requests.push(request);
        response
    };

    if response.delay_ms > 0 {
        thread::sleep(Duration::from_millis(response.delay_ms));
    }

    send_response(&mut stream, &response);
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    // Read until the end of the headers
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find_header_end(&data) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = data.len().min(body_start + content_length);
    let body = String::from_utf8_lossy(&data[body_start..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn send_response(stream: &mut TcpStream, response: &MockResponse) {
    let raw = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason_phrase(response.status),
        response.content_type,
        response.declared_length.unwrap_or(response.body.len()),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes());
    let _ = stream.flush();
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let server = MockApiServer::start().unwrap();
        server
            .respond("GET", "/ping/", MockResponse::text(500, "first"))
            .respond("GET", "/ping/", MockResponse::text(200, "second"));

        let client = reqwest::Client::new();
        let url = format!("{}/ping/?x=1", server.base_url());

        let first = client.get(&url).send().await.unwrap();
        assert_eq!(first.status().as_u16(), 500);
        let second = client.get(&url).send().await.unwrap();
        assert_eq!(second.text().await.unwrap(), "second");
        // Last response repeats
        let third = client.get(&url).send().await.unwrap();
        assert_eq!(third.status().as_u16(), 200);

        let seen = server.requests_to("/ping/");
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].path, "/ping/?x=1");
    }

    #[tokio::test]
    async fn test_records_headers_and_body() {
        let server = MockApiServer::start().unwrap();
        server.respond("POST", "/echo/", MockResponse::json(201, serde_json::json!({})));

        let client = reqwest::Client::new();
        client
            .post(format!("{}/echo/", server.base_url()))
            .header("X-Test", "yes")
            .body(r#"{"a":1}"#)
            .send()
            .await
            .unwrap();

        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].header("x-test"), Some("yes"));
        assert_eq!(seen[0].json_body(), Some(serde_json::json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn test_unscripted_route_is_404() {
        let server = MockApiServer::start().unwrap();
        let response = reqwest::get(format!("{}/nope/", server.base_url()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
