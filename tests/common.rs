// tests/common.rs

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{BoxFuture, FutureExt};
use repo_explorer::config::Config;
use repo_explorer::errors::Result;
use repo_explorer::git::{HttpResponse, HttpTransport};
use repo_explorer::progress::{FetchStage, ProgressReporter};
use repo_explorer::RepositoryService;
use serde_json::json;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

// Helper function to get the binary command
#[allow(dead_code)] // This is used by some integration tests, but not all.
pub fn repo_explorer_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("repo-explorer"))
}

/// In-memory transport. A request is answered by the longest registered
/// pattern its URL path ends with; the query string is ignored and unmatched
/// URLs get a 404.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(String, HttpResponse)>>,
    calls: Mutex<Vec<(String, Instant)>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response, so callers can overlap or time out.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn route(self, pattern: &str, response: HttpResponse) -> Self {
        self.set_route(pattern, response);
        self
    }

    /// Adds or replaces a route on a shared transport.
    pub fn set_route(&self, pattern: &str, response: HttpResponse) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(p, _)| p != pattern);
        routes.push((pattern.to_string(), response));
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.contains(pattern))
            .count()
    }

    /// When each request whose URL contains `pattern` was issued, in call order.
    pub fn call_times_matching(&self, pattern: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.contains(pattern))
            .map(|(_, at)| *at)
            .collect()
    }

    /// The largest number of requests that were awaiting a response at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str) -> HttpResponse {
        let path = Url::parse(url)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        self.routes
            .lock()
            .unwrap()
            .iter()
            .filter(|(pattern, _)| path.ends_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| HttpResponse::new(404, r#"{"message":"Not Found"}"#))
    }
}

impl HttpTransport for MockTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>> {
        self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
        let response = self.respond(url);
        let delay = self.delay;
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak);
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(response)
        }
        .boxed()
    }
}

#[allow(dead_code)]
pub fn repo_response(default_branch: &str) -> HttpResponse {
    HttpResponse::new(
        200,
        json!({ "full_name": "acme/widgets", "default_branch": default_branch }).to_string(),
    )
}

/// A tree listing; paths ending in `/` become `tree` entries.
#[allow(dead_code)]
pub fn tree_response(paths: &[&str]) -> HttpResponse {
    let tree: Vec<_> = paths
        .iter()
        .map(|path| match path.strip_suffix('/') {
            Some(dir) => json!({ "path": dir, "mode": "040000", "type": "tree", "sha": "t" }),
            None => json!({ "path": path, "mode": "100644", "type": "blob", "sha": "b", "size": 1 }),
        })
        .collect();
    HttpResponse::new(200, json!({ "sha": "root", "tree": tree, "truncated": false }).to_string())
}

/// A contents-API response carrying `text`, base64-wrapped as GitHub does.
#[allow(dead_code)]
pub fn contents_response(text: &str) -> HttpResponse {
    let encoded = STANDARD.encode(text.as_bytes());
    // GitHub breaks the payload into 60-character lines.
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    HttpResponse::new(
        200,
        json!({ "type": "file", "encoding": "base64", "content": wrapped }).to_string(),
    )
}

#[allow(dead_code)]
pub fn rate_limited_response() -> HttpResponse {
    HttpResponse::new(403, r#"{"message":"API rate limit exceeded"}"#)
        .with_header("X-RateLimit-Remaining", "0")
        .with_header("X-RateLimit-Reset", "1700000000")
}

/// The acme/widgets repository on `main` with the given tree.
#[allow(dead_code)]
pub fn widgets_transport(paths: &[&str]) -> MockTransport {
    MockTransport::new()
        .route("/repos/acme/widgets", repo_response("main"))
        .route("/repos/acme/widgets/git/trees/main", tree_response(paths))
}

#[allow(dead_code)]
pub fn service_over(transport: Arc<MockTransport>) -> RepositoryService {
    RepositoryService::with_transport(Config::new_for_test(), transport).unwrap()
}

#[allow(dead_code)]
pub fn service_with(config: Config, transport: Arc<MockTransport>) -> RepositoryService {
    RepositoryService::with_transport(config, transport).unwrap()
}

/// Records announced stages and whether the reporter was finished.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingProgress {
    stages: Mutex<Vec<FetchStage>>,
    finished: Mutex<Option<String>>,
}

#[allow(dead_code)]
impl RecordingProgress {
    pub fn stages(&self) -> Vec<FetchStage> {
        self.stages.lock().unwrap().clone()
    }

    /// The final message, if the reporter was finished.
    pub fn finished_with(&self) -> Option<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn set_length(&self, _len: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self) {
        *self.finished.lock().unwrap() = Some(String::new());
    }
    fn finish_with_message(&self, msg: String) {
        *self.finished.lock().unwrap() = Some(msg);
    }
    fn set_stage(&self, stage: FetchStage) {
        self.stages.lock().unwrap().push(stage);
    }
}
