//! Common test utilities: scripted providers and a local HTTP stub
#![allow(dead_code)]

use raws_search::search::normalize::RawPayload;
use raws_search::search::{
    ImageProvider, ImageResult, ImageSource, ProviderError, ProviderPage, ProviderQuery,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test fixture for files read by the crate (configs, geo tables)
pub struct TestFixture {
    /// Temporary directory that gets cleaned up automatically
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a test file with given content
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let filepath = self.path().join(name);
        std::fs::write(&filepath, content).expect("Failed to write test file");
        filepath
    }
}

/// Build a minimal result for scripting providers
pub fn image(id: &str, source: ImageSource, featured: bool) -> ImageResult {
    let mut result = ImageResult::new(
        id,
        format!("Style {}", id),
        format!("https://img.example/{}.jpg", id),
        source,
    );
    result.featured = featured;
    result
}

/// `count` results with ids `<prefix>-<n>`
pub fn images(prefix: &str, source: ImageSource, count: usize) -> Vec<ImageResult> {
    (1..=count)
        .map(|n| image(&format!("{}-{}", prefix, n), source, false))
        .collect()
}

/// What a [`MockProvider`] does when searched
#[derive(Clone)]
pub enum Behavior {
    Answer {
        images: Vec<ImageResult>,
        total_results: Option<u64>,
    },
    Empty,
    RateLimited,
    Unavailable,
    ServerError,
    /// Never completes on its own
    Hang,
}

/// Scripted provider that counts its calls
pub struct MockProvider {
    source: ImageSource,
    behavior: Behavior,
    calls: AtomicUsize,
    last_query: Mutex<Option<ProviderQuery>>,
}

impl MockProvider {
    pub fn new(source: ImageSource, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            source,
            behavior,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn answering(source: ImageSource, images: Vec<ImageResult>, total_results: Option<u64>) -> Arc<Self> {
        Self::new(
            source,
            Behavior::Answer {
                images,
                total_results,
            },
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<ProviderQuery> {
        self.last_query.lock().unwrap().clone()
    }

    fn name(&self) -> &'static str {
        self.source.as_str()
    }
}

#[async_trait::async_trait]
impl ImageProvider for MockProvider {
    fn source(&self) -> ImageSource {
        self.source
    }

    async fn fetch(&self, _query: &ProviderQuery) -> Result<RawPayload, ProviderError> {
        Ok(RawPayload::Json(serde_json::json!({ "items": [] })))
    }

    async fn search(&self, query: &ProviderQuery) -> Result<ProviderPage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        match &self.behavior {
            Behavior::Answer {
                images,
                total_results,
            } => Ok(ProviderPage {
                images: images.clone(),
                total_results: *total_results,
            }),
            Behavior::Empty => Ok(ProviderPage::empty()),
            Behavior::RateLimited => Err(ProviderError::RateLimited {
                provider: self.name(),
            }),
            Behavior::Unavailable => Err(ProviderError::Unavailable {
                provider: self.name(),
                reason: "credentials missing".to_string(),
            }),
            Behavior::ServerError => Err(ProviderError::Http {
                provider: self.name(),
                status: 500,
                message: "backend error".to_string(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ProviderPage::empty())
            }
        }
    }
}

/// Erase mock types for chain construction
pub fn chain_of(providers: &[&Arc<MockProvider>]) -> Vec<Arc<dyn ImageProvider>> {
    providers
        .iter()
        .map(|p| Arc::clone(*p) as Arc<dyn ImageProvider>)
        .collect()
}

/// Canned response served by [`StubServer`]
#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Single-response HTTP/1.1 server on a loopback port, recording request heads
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(response: StubResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let response = response.clone();
                let recorded = Arc::clone(&recorded);

                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    loop {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                buf.extend_from_slice(&chunk[..n]);
                                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }
                    recorded
                        .lock()
                        .unwrap()
                        .push(String::from_utf8_lossy(&buf).into_owned());

                    if !response.delay.is_zero() {
                        tokio::time::sleep(response.delay).await;
                    }

                    let head = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        response.status,
                        response.content_type,
                        response.body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(response.body.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Raw request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// First line of the first request (`GET /path?query HTTP/1.1`)
    pub fn first_request_line(&self) -> String {
        self.requests()
            .first()
            .and_then(|r| r.lines().next())
            .unwrap_or_default()
            .to_string()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
