// src/git/api.rs
//! Cached, coalesced access to the three GitHub REST endpoints the explorer needs.
//!
//! Repository metadata and tree listings are cached by request URL. Decoded
//! file content is cached as text under an `owner/repo/branch/path` key, so
//! the raw contents JSON is never retained.

use super::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::cache::ApiCache;
use crate::coalesce::RequestCoalescer;
use crate::config::Config;
use crate::constants::RATE_LIMIT_WARN_THRESHOLD;
use crate::core_types::{RepoRef, TreeEntry};
use crate::errors::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// What the shared cache and coalescer hold.
#[derive(Debug, Clone)]
enum CachedValue {
    Json(Arc<Value>),
    Text(Arc<str>),
}

/// The payload of `GET /repos/{owner}/{repo}/git/trees/{branch}`.
#[derive(Deserialize, Debug)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// A GitHub REST client with a process-lifetime cache and request coalescing.
///
/// Cloning is not supported; share it behind an `Arc` instead.
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<ApiCache<CachedValue>>,
    coalescer: RequestCoalescer<CachedValue>,
    api_base: Url,
}

impl GitHubClient {
    /// Creates a client that talks to `config.api_base_url` over `reqwest`.
    ///
    /// # Errors
    /// Returns `Error::Config` if the HTTP client or base URL is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_base = Url::parse(&config.api_base_url).map_err(|e| {
            Error::Config(format!(
                "invalid API base URL '{}': {}",
                config.api_base_url, e
            ))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL cannot carry a path: '{}'",
                config.api_base_url
            )));
        }
        Ok(Self {
            transport,
            cache: Arc::new(ApiCache::new(config.cache_ttl, config.cache_max_entries)),
            coalescer: RequestCoalescer::new(),
            api_base,
        })
    }

    /// Builds an endpoint URL below the API base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str], query: Option<(&str, &str)>) -> String {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some((name, value)) = query {
            url.query_pairs_mut().append_pair(name, value);
        }
        url.into()
    }

    /// GETs `url` and returns its JSON body, served from cache when fresh.
    ///
    /// Concurrent calls for the same URL share a single transport request.
    ///
    /// # Errors
    /// Returns the classified HTTP error, `Error::Network` on transport
    /// failure, or `Error::Decode` if the body is not JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Arc<Value>> {
        if let Some(CachedValue::Json(value)) = self.cache.get(url) {
            log::debug!("Cache hit: {}", url);
            return Ok(value);
        }
        log::debug!("Cache miss: {}", url);

        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let epoch = cache.epoch();
        let owned_url = url.to_string();

        let outcome = self
            .coalescer
            .run(url, move || async move {
                let response = transport.get(&owned_url).await?;
                let value = Arc::new(parse_json_response(&owned_url, &response)?);
                cache.put_if_epoch(epoch, owned_url.clone(), CachedValue::Json(Arc::clone(&value)));
                Ok(CachedValue::Json(value))
            })
            .await?;

        match outcome {
            CachedValue::Json(value) => Ok(value),
            CachedValue::Text(_) => Err(Error::Internal(format!(
                "cache key '{}' holds text, expected JSON",
                url
            ))),
        }
    }

    /// Looks up the repository's default branch.
    ///
    /// # Errors
    /// Fails with the classified HTTP error, or `Error::Decode` if the
    /// metadata has no `default_branch`.
    pub async fn get_default_branch(&self, repo: &RepoRef) -> Result<String> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.repo], None);
        let metadata = self.fetch_json(&url).await?;
        metadata
            .get("default_branch")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Decode(format!("no default_branch in metadata for {}", repo)))
    }

    /// Fetches the recursive tree listing of `branch`.
    ///
    /// A listing the provider marks as truncated is returned as-is, with a
    /// warning.
    pub async fn get_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeEntry>> {
        let url = self.endpoint(
            &["repos", &repo.owner, &repo.repo, "git", "trees", branch],
            Some(("recursive", "1")),
        );
        let payload = self.fetch_json(&url).await?;
        let response = TreeResponse::deserialize(&*payload)
            .map_err(|e| Error::Decode(format!("invalid tree listing for {}: {}", repo, e)))?;
        if response.truncated {
            log::warn!(
                "Tree listing for {} on '{}' was truncated by GitHub; some files are missing.",
                repo,
                branch
            );
        }
        log::debug!("Tree for {}@{}: {} entries", repo, branch, response.tree.len());
        Ok(response.tree)
    }

    /// Fetches and decodes one file's content as text.
    ///
    /// The decoded text is cached and coalesced under `owner/repo/branch/path`.
    ///
    /// # Errors
    /// Fails with the classified HTTP error, or `Error::Decode` if `path` is a
    /// directory or the content is not base64-encoded.
    pub async fn get_file_content(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<String> {
        let key = format!("{}/{}/{}/{}", repo.owner, repo.repo, branch, path);
        if let Some(CachedValue::Text(text)) = self.cache.get(&key) {
            log::debug!("Cache hit: {}", key);
            return Ok(text.to_string());
        }

        let mut segments = vec!["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments, Some(("ref", branch)));

        let transport = Arc::clone(&self.transport);
        let cache = Arc::clone(&self.cache);
        let epoch = cache.epoch();
        let cache_key = key.clone();
        let owned_path = path.to_string();

        let outcome = self
            .coalescer
            .run(&key, move || async move {
                let response = transport.get(&url).await?;
                let payload = parse_json_response(&url, &response)?;
                let text: Arc<str> = decode_file_content(&payload, &owned_path)?.into();
                cache.put_if_epoch(epoch, cache_key, CachedValue::Text(Arc::clone(&text)));
                Ok(CachedValue::Text(text))
            })
            .await?;

        match outcome {
            CachedValue::Text(text) => Ok(text.to_string()),
            CachedValue::Json(_) => Err(Error::Internal(format!(
                "cache key '{}' holds JSON, expected text",
                key
            ))),
        }
    }

    /// Drops every cached response and forgets in-flight requests.
    pub fn clear(&self) {
        self.cache.clear();
        self.coalescer.clear();
        log::debug!("API cache cleared.");
    }

    /// Number of cached responses.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn parse_json_response(url: &str, response: &HttpResponse) -> Result<Value> {
    classify_response(url, response)?;
    serde_json::from_str(&response.body)
        .map_err(|e| Error::Decode(format!("invalid JSON from {}: {}", url, e)))
}

/// Maps a non-success response to the error variant that tells callers what to do.
fn classify_response(url: &str, response: &HttpResponse) -> Result<()> {
    let remaining = response
        .header("x-ratelimit-remaining")
        .and_then(|v| v.trim().parse::<u64>().ok());
    let reset_at = response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<u64>().ok());

    if let Some(remaining) = remaining {
        log::debug!(
            "Rate limit: {} remaining (limit {}, resets at {})",
            remaining,
            response.header("x-ratelimit-limit").unwrap_or("?"),
            reset_at.map_or_else(|| "?".to_string(), |r| r.to_string())
        );
        if remaining > 0 && remaining <= RATE_LIMIT_WARN_THRESHOLD {
            log::warn!(
                "Only {} GitHub API requests remaining before the rate limit.",
                remaining
            );
        }
    }

    if response.is_success() {
        return Ok(());
    }

    match response.status {
        404 => Err(Error::NotFound {
            resource: url.to_string(),
        }),
        403 if remaining == Some(0) => Err(Error::RateLimited { reset_at }),
        403 => Err(Error::Forbidden {
            resource: url.to_string(),
        }),
        401 => Err(Error::InvalidCredential),
        status => Err(Error::Provider {
            status,
            message: provider_message(response),
        }),
    }
}

fn provider_message(response: &HttpResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| {
            reqwest::StatusCode::from_u16(response.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Decodes a contents-API payload into text.
///
/// Lossy fallbacks keep a single odd file from failing: invalid UTF-8 is read
/// as Latin-1 and invalid base64 is returned undecoded, both with a warning.
///
/// # Errors
/// Returns `Error::Decode` for a directory listing, a non-object payload or
/// a non-base64 encoding.
pub fn decode_file_content(payload: &Value, path: &str) -> Result<String> {
    if payload.is_array() {
        return Err(Error::Decode(format!("'{}' is a directory, not a file", path)));
    }
    let object = payload
        .as_object()
        .ok_or_else(|| Error::Decode(format!("unexpected contents payload for '{}'", path)))?;

    let encoding = object.get("encoding").and_then(Value::as_str);
    if encoding != Some("base64") {
        return Err(Error::Decode(format!(
            "unsupported encoding '{}' for '{}' (files over 1 MB are not served inline)",
            encoding.unwrap_or("none"),
            path
        )));
    }
    let content = object.get("content").and_then(Value::as_str).unwrap_or_default();
    Ok(decode_base64_text(content, path))
}

fn decode_base64_text(content: &str, path: &str) -> String {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("'{}' is not valid UTF-8; decoding as Latin-1.", path);
                e.into_bytes().into_iter().map(char::from).collect()
            }
        },
        Err(e) => {
            log::warn!("Failed to decode base64 content of '{}': {}", path, e);
            content.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticTransport {
        response: HttpResponse,
        calls: AtomicUsize,
    }

    impl StaticTransport {
        fn new(response: HttpResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HttpTransport for StaticTransport {
        fn get<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<HttpResponse>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = self.response.clone();
            async move { Ok(response) }.boxed()
        }
    }

    fn client_over(transport: Arc<StaticTransport>) -> GitHubClient {
        GitHubClient::with_transport(&Config::new_for_test(), transport).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments_under_base_path() {
        let config = Config {
            api_base_url: "https://ghe.example.com/api/v3".to_string(),
            ..Config::new_for_test()
        };
        let client =
            GitHubClient::with_transport(&config, StaticTransport::new(HttpResponse::new(200, "{}")))
                .unwrap();
        let url = client.endpoint(
            &["repos", "acme", "widgets", "contents", "docs", "read me.md"],
            Some(("ref", "main")),
        );
        assert_eq!(
            url,
            "https://ghe.example.com/api/v3/repos/acme/widgets/contents/docs/read%20me.md?ref=main"
        );
    }

    #[test]
    fn test_classify_rate_limit_versus_forbidden() {
        let limited = HttpResponse::new(403, "{}")
            .with_header("X-RateLimit-Remaining", "0")
            .with_header("X-RateLimit-Reset", "1700000000");
        assert_eq!(
            classify_response("u", &limited),
            Err(Error::RateLimited {
                reset_at: Some(1_700_000_000)
            })
        );

        let forbidden = HttpResponse::new(403, "{}").with_header("X-RateLimit-Remaining", "42");
        assert!(matches!(
            classify_response("u", &forbidden),
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            classify_response("u", &HttpResponse::new(403, "")),
            Err(Error::Forbidden { .. })
        ));
    }

    #[test]
    fn test_classify_other_statuses() {
        assert!(matches!(
            classify_response("u", &HttpResponse::new(404, "")),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(
            classify_response("u", &HttpResponse::new(401, "")),
            Err(Error::InvalidCredential)
        );
        assert_eq!(
            classify_response("u", &HttpResponse::new(500, r#"{"message":"Server Error"}"#)),
            Err(Error::Provider {
                status: 500,
                message: "Server Error".to_string()
            })
        );
        assert_eq!(
            classify_response("u", &HttpResponse::new(502, "<html>")),
            Err(Error::Provider {
                status: 502,
                message: "Bad Gateway".to_string()
            })
        );
        assert!(classify_response("u", &HttpResponse::new(200, "{}")).is_ok());
    }

    #[test]
    fn test_decode_file_content_variants() {
        let hello = json!({"encoding": "base64", "content": "aGVs\nbG8=\n"});
        assert_eq!(decode_file_content(&hello, "a.txt").unwrap(), "hello");

        // 0xE9 alone is not valid UTF-8; Latin-1 maps it to 'é'.
        let latin1 = json!({"encoding": "base64", "content": STANDARD.encode([0x63, 0x61, 0x66, 0xE9])});
        assert_eq!(decode_file_content(&latin1, "b.txt").unwrap(), "café");

        let broken = json!({"encoding": "base64", "content": "!!!not-base64"});
        assert_eq!(decode_file_content(&broken, "c.txt").unwrap(), "!!!not-base64");

        let directory = json!([{"name": "x"}]);
        assert!(matches!(
            decode_file_content(&directory, "src"),
            Err(Error::Decode(_))
        ));

        let large = json!({"encoding": "none", "content": ""});
        assert!(matches!(
            decode_file_content(&large, "big.bin"),
            Err(Error::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_caches_by_url() {
        let transport = StaticTransport::new(HttpResponse::new(200, r#"{"default_branch":"main"}"#));
        let client = client_over(Arc::clone(&transport));
        let repo = RepoRef::new("acme", "widgets");

        assert_eq!(client.get_default_branch(&repo).await.unwrap(), "main");
        assert_eq!(client.get_default_branch(&repo).await.unwrap(), "main");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        client.clear();
        assert_eq!(client.get_default_branch(&repo).await.unwrap(), "main");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_file_requests_share_one_call() {
        let transport = StaticTransport::new(HttpResponse::new(
            200,
            r#"{"type":"file","encoding":"base64","content":"Zm4gbWFpbigpIHt9"}"#,
        ));
        let client = client_over(Arc::clone(&transport));
        let repo = RepoRef::new("acme", "widgets");

        let (a, b) = futures::join!(
            client.get_file_content(&repo, "src/main.rs", "main"),
            client.get_file_content(&repo, "src/main.rs", "main"),
        );
        assert_eq!(a.unwrap(), "fn main() {}");
        assert_eq!(b.unwrap(), "fn main() {}");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.cached_entries(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let transport = StaticTransport::new(HttpResponse::new(404, r#"{"message":"Not Found"}"#));
        let client = client_over(Arc::clone(&transport));
        let repo = RepoRef::new("acme", "missing");

        assert!(matches!(
            client.get_default_branch(&repo).await,
            Err(Error::NotFound { .. })
        ));
        assert!(client.get_default_branch(&repo).await.is_err());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.cached_entries(), 0);
    }
}
