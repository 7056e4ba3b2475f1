//! Defines the core `Config` struct for the repository-data access layer.
//!
//! This module consolidates every tunable of the access layer (credential,
//! cache sizing, concurrency and batching, timeouts) in one structured,
//! validated value. Build it with [`ConfigBuilder`].

use std::fmt;
use std::time::Duration;

pub use builder::ConfigBuilder;
mod builder;

/// Configuration for the API client, cache, queue and repository service.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the REST API, without a trailing slash.
    pub api_base_url: String,
    /// Optional personal access token. Absence only lowers the rate ceiling.
    pub token: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// How long cached responses stay valid.
    pub cache_ttl: Duration,
    /// Maximum number of distinct cache keys.
    pub cache_max_entries: usize,
    /// Maximum simultaneous file-content requests.
    pub max_concurrent: usize,
    /// Files per batch in a bulk fetch.
    pub batch_size: usize,
    /// Pause between batches of a bulk fetch.
    pub batch_delay: Duration,
    /// Time budget for branch and tree lookups.
    pub api_timeout: Duration,
    /// Time budget for one file fetch.
    pub file_timeout: Duration,
}

// Custom Debug implementation so the token never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("max_concurrent", &self.max_concurrent)
            .field("batch_size", &self.batch_size)
            .field("batch_delay", &self.batch_delay)
            .field("api_timeout", &self.api_timeout)
            .field("file_timeout", &self.file_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            api_timeout: DEFAULT_API_TIMEOUT,
            file_timeout: DEFAULT_FILE_TIMEOUT,
        }
    }
}

impl Config {
    /// Creates a `Config` for tests: default values, a fake API host and no
    /// inter-batch delay.
    #[doc(hidden)]
    pub fn new_for_test() -> Self {
        Self {
            api_base_url: "https://api.github.test".to_string(),
            batch_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
