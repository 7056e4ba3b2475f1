//! The HTTP seam in front of the GitHub REST API.
//!
//! [`HttpTransport`] is the only place network I/O happens. The production
//! implementation wraps a `reqwest` client with GitHub's default headers;
//! tests substitute an in-memory transport.

use crate::config::Config;
use crate::constants::GITHUB_ACCEPT_HEADER;
use crate::errors::{Error, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use std::collections::HashMap;

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header (the name is lowercased).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests against the provider.
pub trait HttpTransport: Send + Sync {
    /// Performs a GET and buffers the whole response.
    ///
    /// Only transport-level failures are errors; non-2xx statuses are
    /// returned as responses for the caller to classify.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client carrying the Accept, User-Agent and (optional) bearer
    /// token headers from `config`.
    ///
    /// # Errors
    /// Returns `Error::Config` if a header value is invalid or the client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT_HEADER));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?,
        );

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Config("GITHUB_TOKEN contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
            log::debug!("Using GITHUB_TOKEN for authentication.");
        } else {
            log::debug!("No GITHUB_TOKEN set; using unauthenticated rate limits.");
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HttpResponse>> {
        async move {
            log::debug!("GET {}", url);
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| Error::Network(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = HttpResponse::new(403, "{}").with_header("X-RateLimit-Remaining", "0");
        assert_eq!(response.header("x-ratelimit-remaining"), Some("0"));
        assert_eq!(response.header("X-RATELIMIT-REMAINING"), Some("0"));
        assert_eq!(response.header("x-ratelimit-reset"), None);
        assert!(!response.is_success());
        assert!(HttpResponse::new(204, "").is_success());
    }

    #[test]
    fn test_reqwest_transport_builds_with_and_without_token() {
        let anonymous = ConfigBuilder::new().build().unwrap();
        assert!(ReqwestTransport::new(&anonymous).is_ok());

        let authed = ConfigBuilder::new().token("ghp_example").build().unwrap();
        assert!(ReqwestTransport::new(&authed).is_ok());
    }

    #[test]
    fn test_reqwest_transport_rejects_invalid_token() {
        let config = ConfigBuilder::new().token("bad\ntoken").build().unwrap();
        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(Error::Config(_))
        ));
    }
}
