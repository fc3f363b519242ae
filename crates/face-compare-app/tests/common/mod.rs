//! Shared fixtures for app integration tests.

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use face_compare_acquire::StaticFileSource;
use face_compare_app::{AppConfig, Workflow, WorkflowEvent};
use face_compare_client::{
    ComparisonTransport, HttpResponse, MultipartBody, TransportError,
};
use face_compare_core::Role;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use url::Url;

/// Encodes a deterministic RGB gradient as PNG.
#[allow(dead_code)]
pub fn fixture_png(width: u32, height: u32) -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 17 % 256) as u8, (y * 29 % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("png fixture should encode");
    bytes
}

/// In-memory files registered under short locators.
#[allow(dead_code)]
pub fn fixture_source() -> Arc<StaticFileSource> {
    let source = StaticFileSource::new();
    source
        .insert("before", "before.png", fixture_png(4, 3))
        .expect("fixture insert");
    source
        .insert("after", "after.png", fixture_png(5, 2))
        .expect("fixture insert");
    source
        .insert("replacement", "replacement.png", fixture_png(6, 6))
        .expect("fixture insert");
    source
        .insert("broken", "broken.jpg", b"not really a jpeg".to_vec())
        .expect("fixture insert");
    Arc::new(source)
}

/// Transport answering every call with one canned result and counting calls.
#[allow(dead_code)]
pub struct RecordingTransport {
    response: Result<HttpResponse, TransportError>,
    calls: AtomicUsize,
    last_form: Mutex<Option<MultipartBody>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn new(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
            last_form: Mutex::new(None),
        })
    }

    pub fn answering(status: u16, body: &str) -> Arc<Self> {
        Self::new(Ok(HttpResponse::new(status, body)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_form(&self) -> Option<MultipartBody> {
        self.last_form.lock().expect("form lock").clone()
    }
}

impl ComparisonTransport for RecordingTransport {
    fn post_multipart(
        &self,
        _endpoint: &Url,
        form: &MultipartBody,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_form.lock().expect("form lock") = Some(form.clone());
        self.response.clone()
    }

    fn get(&self, _endpoint: &Url) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Builds a workflow over the fixture source and `transport`.
#[allow(dead_code)]
pub fn workflow_with(
    transport: Arc<dyn ComparisonTransport>,
    config: &AppConfig,
) -> (Workflow, Receiver<WorkflowEvent>) {
    let (events_tx, events_rx) = mpsc::channel();
    let workflow = Workflow::new(config, transport, fixture_source(), events_tx)
        .expect("workflow should build");
    (workflow, events_rx)
}

/// Workflow with both slots filled and previews settled.
#[allow(dead_code)]
pub fn loaded_workflow(
    transport: Arc<dyn ComparisonTransport>,
) -> (Workflow, Receiver<WorkflowEvent>) {
    let (mut workflow, events) = workflow_with(transport, &AppConfig::default());
    workflow
        .select(Role::Before, "before")
        .expect("before should load");
    workflow.select(Role::After, "after").expect("after should load");
    workflow
        .wait_for_settled(&events)
        .expect("previews should settle");
    (workflow, events)
}

/// One-connection HTTP stub on loopback.
#[allow(dead_code)]
pub struct StubServer {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    handle: JoinHandle<Vec<u8>>,
}

#[allow(dead_code)]
impl StubServer {
    /// Serves exactly one request with `status` and a JSON `body`.
    pub fn spawn(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("stub should bind");
        let base_url = format!(
            "http://{}",
            listener.local_addr().expect("stub local addr")
        );
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("stub should accept");
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("stub should respond");
            request
        });

        Self { base_url, handle }
    }

    /// Waits for the served request and returns its raw bytes.
    pub fn request(self) -> Vec<u8> {
        self.handle.join().expect("stub thread should finish")
    }
}

fn read_request(stream: &mut impl Read) -> Vec<u8> {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).expect("stub should read");
        if read == 0 {
            return request;
        }
        request.extend_from_slice(&chunk[..read]);
        if let Some(position) = find(&request, b"\r\n\r\n") {
            break position + 4;
        }
    };

    let headers = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while request.len() < header_end + content_length {
        let read = stream.read(&mut chunk).expect("stub should read body");
        if read == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..read]);
    }
    request
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// URL on loopback whose port has no listener.
#[allow(dead_code)]
pub fn closed_port_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("probe should bind");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/compare")
}
