//! Shared test utilities for the magic-card test suite.
//!
//! - Sample data: a backend response body and the matching [`ContentDetail`].
//! - [`TestServer`]: a minimal HTTP server on `127.0.0.1:0` that answers every
//!   request with a canned response and records what it received.
//! - [`png_bytes`]: a real encoded PNG for capture backends to return.
//! - [`MockClient`]: a [`SummaryClient`] with a scripted result.
//! - [`MockCapturer`]: a [`Capturer`] that returns canned bytes.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let server = TestServer::respond(200, &sample_detail_json());
//! let client = HttpSummaryClient::new(&server.url(), "/api/magic", None).unwrap();
//! // ... fetch ...
//! assert!(server.last_request().starts_with("POST /api/magic"));
//! ```

use crate::client::{FetchError, SummaryClient};
use crate::export::{CaptureError, CaptureRequest, Capturer};
use crate::types::{ContentDetail, Highlight, UrlDescriptor};
use async_trait::async_trait;
use std::io::{Read as _, Write as _};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// =========================================================================
// Sample data
// =========================================================================

pub fn sample_detail() -> ContentDetail {
    ContentDetail {
        title: "Rust in ten minutes".to_string(),
        summary: "Ownership, borrowing and lifetimes explained with one running example."
            .to_string(),
        length: Some("10:42".to_string()),
        confidence: "97%".to_string(),
        highlights: vec![
            Highlight {
                label: "Key point".to_string(),
                text: "Every value has exactly one owner.".to_string(),
            },
            Highlight {
                label: "Tip".to_string(),
                text: "Borrow immutably unless you must mutate.".to_string(),
            },
        ],
    }
}

pub fn sample_detail_json() -> String {
    serde_json::to_string(&sample_detail()).unwrap()
}

// =========================================================================
// HTTP test server
// =========================================================================

/// Canned-response HTTP server. Stops accepting when dropped.
pub struct TestServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    _stop: mpsc::Sender<()>,
}

impl TestServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::channel::<()>();

        let recorded = Arc::clone(&requests);
        let body = body.to_string();
        thread::spawn(move || {
            listener.set_nonblocking(true).unwrap();
            loop {
                if !matches!(rx.try_recv(), Err(TryRecvError::Empty)) {
                    break;
                }
                match listener.accept() {
                    Ok((stream, _)) => serve(stream, status, &body, &recorded),
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            port,
            requests,
            _stop: tx,
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Raw text (head + body) of the most recent request.
    pub fn last_request(&self) -> String {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Read one request, record it, then answer.
fn serve(mut stream: TcpStream, status: u16, body: &str, recorded: &Mutex<Vec<String>>) {
    stream.set_nonblocking(false).unwrap();
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);
        if request_complete(&data) {
            break;
        }
    }

    recorded
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&data).into_owned());

    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Headers received and, if a `Content-Length` was sent, the whole body too.
fn request_complete(data: &[u8]) -> bool {
    let text = String::from_utf8_lossy(data);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    data.len() >= head_end + 4 + content_length
}

// =========================================================================
// Images
// =========================================================================

/// Encode a solid-color RGBA image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([76, 111, 255, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

// =========================================================================
// Summary client mock
// =========================================================================

/// Scripted summary client: returns `detail` or fails with `error_message`,
/// and records every descriptor it was asked for.
#[derive(Default)]
pub struct MockClient {
    pub detail: Option<ContentDetail>,
    pub error_message: Option<String>,
    pub calls: Mutex<Vec<UrlDescriptor>>,
}

impl MockClient {
    pub fn succeeding(detail: ContentDetail) -> Self {
        Self {
            detail: Some(detail),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error_message: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<UrlDescriptor> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryClient for MockClient {
    async fn fetch_summary(
        &self,
        descriptor: &UrlDescriptor,
        _raw_url: &str,
    ) -> Result<ContentDetail, FetchError> {
        self.calls.lock().unwrap().push(descriptor.clone());
        match (&self.detail, &self.error_message) {
            (Some(detail), None) => Ok(detail.clone()),
            (_, Some(message)) => Err(FetchError::Server {
                status: 500,
                message: message.clone(),
            }),
            (None, None) => Err(FetchError::Status(500)),
        }
    }
}

// =========================================================================
// Capture backend mock
// =========================================================================

/// Capture backend that returns canned bytes (or a canned failure) and
/// records every request it receives.
pub struct MockCapturer {
    pub available: bool,
    pub output: Result<Vec<u8>, String>,
    pub requests: Mutex<Vec<CaptureRequest>>,
}

impl MockCapturer {
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self {
            available: true,
            output: Ok(bytes),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            available: true,
            output: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::returning(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Capturer for MockCapturer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError> {
        self.requests.lock().unwrap().push(request.clone());
        self.output.clone().map_err(CaptureError::Failed)
    }
}
