//! Common test utilities for in-process server testing with mocks.
//!
//! The fixture builds the real router over a pipeline whose stages are the
//! core crate's mocks, so requests run end to end without external tools.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use songbundle_core::{
    testing::{MockAcquirer, MockArchiver, MockConverter, MockResolver},
    Config, DownloadPipeline, ProgressEvent, ToolAvailability,
};
use songbundle_server::{api::create_router, state::AppState};

/// Test fixture for in-process HTTP testing with mock stages.
pub struct TestFixture {
    pub router: Router,
    pub resolver: MockResolver,
    pub acquirer: MockAcquirer,
    pub converter: MockConverter,
    pub archiver: MockArchiver,
    /// Holds the pipeline's working areas.
    pub work_dir: TempDir,
}

/// Response from a test request with a JSON body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Response from the download endpoint.
#[derive(Debug)]
pub struct StreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// (event name, payload) pairs in arrival order.
    pub events: Vec<(String, ProgressEvent)>,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture where every external tool reports as installed.
    pub fn new() -> Self {
        Self::with_installed(&["songbundle-resolve", "freyr", "ffmpeg"])
    }

    /// Create a fixture whose availability probe only finds `installed`.
    pub fn with_installed(installed: &'static [&'static str]) -> Self {
        let work_dir = TempDir::new().expect("Failed to create work dir");

        let mut config = Config::default();
        config.pipeline.work_dir = work_dir.path().to_path_buf();

        let resolver = MockResolver::new();
        let acquirer = MockAcquirer::new();
        let converter = MockConverter::new();
        let archiver = MockArchiver::new();

        let pipeline = DownloadPipeline::new(
            config.pipeline.clone(),
            Arc::new(resolver.clone()),
            Arc::new(acquirer.clone()),
            Arc::new(converter.clone()),
            Arc::new(archiver.clone()),
        );

        let tools = vec![
            ("resolver".to_string(), config.resolver.command.program.clone()),
            ("acquisition".to_string(), config.acquisition.command.program.clone()),
            ("transcoder".to_string(), config.transcoder.ffmpeg_path.clone()),
        ];
        let availability = ToolAvailability::with_probe(
            tools,
            Duration::from_secs(30),
            Arc::new(move |program: &Path| {
                let name = program.to_string_lossy();
                installed
                    .contains(&name.as_ref())
                    .then(|| PathBuf::from("/usr/bin").join(program))
            }),
        );

        let state = Arc::new(AppState::new(
            config,
            Arc::new(pipeline),
            Arc::new(availability),
        ));

        Self {
            router: create_router(state),
            resolver,
            acquirer,
            converter,
            archiver,
            work_dir,
        }
    }

    /// Send a GET request and parse the body as JSON.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, _, bytes) = self.send(request).await;
        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Send a GET request and return the body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, _, bytes) = self.send(request).await;
        (status, String::from_utf8(bytes).expect("Body is not UTF-8"))
    }

    /// POST a JSON value to the download endpoint and drain the stream.
    pub async fn download(&self, body: Value) -> StreamResponse {
        self.download_raw(&body.to_string(), "application/json").await
    }

    /// POST a raw body to the download endpoint and drain the stream.
    pub async fn download_raw(&self, body: &str, content_type: &str) -> StreamResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/download")
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let (status, content_type, bytes) = self.send(request).await;
        let text = String::from_utf8(bytes).expect("Body is not UTF-8");
        let is_stream = content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        StreamResponse {
            status,
            content_type,
            events: if is_stream { parse_sse(&text) } else { Vec::new() },
            body: if is_stream {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::Null)
            },
        }
    }

    /// Number of working areas left under the work dir.
    pub fn leftover_areas(&self) -> usize {
        std::fs::read_dir(self.work_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = tokio::time::timeout(Duration::from_secs(10), response.into_body().collect())
            .await
            .expect("Body did not finish in time")
            .expect("Failed to collect body")
            .to_bytes();

        (status, content_type, bytes.to_vec())
    }
}

/// Splits an event-stream body into named events, skipping comments.
pub fn parse_sse(text: &str) -> Vec<(String, ProgressEvent)> {
    text.split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut data = String::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    name = Some(value.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }
            let name = name?;
            let event = serde_json::from_str(&data).expect("Event data is not a progress event");
            Some((name, event))
        })
        .collect()
}
