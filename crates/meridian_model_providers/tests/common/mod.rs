//! Shared test helpers for provider tests.

#![expect(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Once;
use std::time::Duration;

use meridian_models::ModelDescriptor;
use meridian_models::llm::{InvocationRequest, SinkError};
use meridian_models::{ModelRegistry, ModelTier, TierConfig, TierModel, TierRegistrar};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// A canned HTTP response.
pub struct Reply {
    pub status: &'static str,
    pub headers: Vec<(&'static str, String)>,
    /// Body parts, each written and flushed separately.
    pub parts: Vec<Vec<u8>>,
}

impl Reply {
    /// A `200 OK` event stream written in `parts`.
    pub fn events(parts: Vec<Vec<u8>>) -> Self {
        Self {
            status: "200 OK",
            headers: vec![("content-type", "text/event-stream".to_string())],
            parts,
        }
    }

    /// A non-success reply with a plain body.
    pub fn status(status: &'static str, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-length", body.len().to_string())],
            parts: vec![body.as_bytes().to_vec()],
        }
    }

    /// Adds a response header.
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// A single-shot HTTP server on a loopback port.
pub struct MockServer {
    pub url: String,
    request: JoinHandle<String>,
}

impl MockServer {
    /// Serves `reply` to the first connection and records its request.
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let request = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let mut head = format!("HTTP/1.1 {}\r\nconnection: close\r\n", reply.status);
            for (name, value) in &reply.headers {
                head.push_str(&format!("{name}: {value}\r\n"));
            }
            head.push_str("\r\n");
            socket.write_all(head.as_bytes()).await.unwrap();

            for part in reply.parts {
                socket.write_all(&part).await.unwrap();
                socket.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            let _ = socket.shutdown().await;
            request
        });

        Self { url, request }
    }

    /// Returns the raw request the server received.
    pub async fn request(self) -> String {
        self.request.await.unwrap()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map_or(0, |value| value.trim().parse::<usize>().unwrap());
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

/// Returns a descriptor pointing at `base_url` for the given protocol.
pub fn descriptor(id: &str, api: &str, base_url: &str) -> ModelDescriptor {
    let mut descriptor = meridian_models::testing::descriptor(id);
    descriptor.api = api.to_string();
    descriptor.base_url = base_url.to_string();
    descriptor
}

/// Registers both tiers against `provider`, with the small tier at `small`.
pub fn small_model(
    provider: Arc<dyn meridian_models::llm::StreamingProvider>,
    small: ModelDescriptor,
) -> TierModel {
    let large = ModelDescriptor {
        id: "unused-large".to_string(),
        ..small.clone()
    };
    let mut registry = ModelRegistry::new();
    TierRegistrar::new(provider, TierConfig::new(large, small))
        .register(&mut registry)
        .unwrap();
    registry.model(ModelTier::Small).unwrap()
}

/// Runs `request` with a sink that records every chunk.
pub async fn generate_recording(
    model: &TierModel,
    request: InvocationRequest,
) -> (
    Result<String, meridian_models::llm::GenerationError>,
    Vec<String>,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let result = model
        .generate_streaming(request, move |chunk: &str| -> Result<(), SinkError> {
            sink_seen.lock().unwrap().push(chunk.to_string());
            Ok(())
        })
        .await;
    let seen = seen.lock().unwrap().clone();
    (result, seen)
}
