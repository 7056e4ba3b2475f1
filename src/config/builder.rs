// src/config/builder.rs

use super::Config;
use crate::cli::Cli;
use crate::constants::{API_URL_ENV_VAR, TOKEN_ENV_VAR};
use crate::errors::{Error, Result};
use std::time::Duration;

/// A builder for creating a [`Config`] programmatically or from the CLI.
///
/// Unset fields fall back to the defaults in [`crate::constants`].
///
/// # Examples
///
/// ```
/// use repo_explorer::ConfigBuilder;
/// use std::time::Duration;
///
/// let config = ConfigBuilder::new()
///     .max_concurrent(5)
///     .batch_delay(Duration::from_millis(100))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_concurrent, 5);
/// assert!(config.token.is_none());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    api_base_url: Option<String>,
    token: Option<String>,
    user_agent: Option<String>,
    cache_ttl: Option<Duration>,
    cache_max_entries: Option<usize>,
    max_concurrent: Option<usize>,
    batch_size: Option<usize>,
    batch_delay: Option<Duration>,
    api_timeout: Option<Duration>,
    file_timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Creates a new builder with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from `GITHUB_TOKEN` and `GITHUB_API_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            token: non_empty(TOKEN_ENV_VAR).map(|t| t.trim().to_string()),
            api_base_url: non_empty(API_URL_ENV_VAR),
            ..Self::default()
        }
    }

    /// Creates a builder from the environment, with CLI flags taking precedence.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::from_env().apply_cli(cli)
    }

    fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.api_url {
            self.api_base_url = Some(url.clone());
        }
        if let Some(n) = cli.max_concurrent {
            self.max_concurrent = Some(n);
        }
        if let Some(n) = cli.batch_size {
            self.batch_size = Some(n);
        }
        if let Some(ms) = cli.batch_delay_ms {
            self.batch_delay = Some(Duration::from_millis(ms));
        }
        if let Some(secs) = cli.api_timeout_secs {
            self.api_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = cli.file_timeout_secs {
            self.file_timeout = Some(Duration::from_secs(secs));
        }
        self
    }

    /// Sets the REST API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }
    /// Sets the personal access token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
    /// Sets the `User-Agent` header value.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
    /// Sets the cache TTL.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
    /// Sets the maximum number of cache entries.
    pub fn cache_max_entries(mut self, max: usize) -> Self {
        self.cache_max_entries = Some(max);
        self
    }
    /// Sets the maximum number of simultaneous file requests.
    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }
    /// Sets the number of files per batch.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    /// Sets the pause between batches.
    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }
    /// Sets the branch/tree lookup timeout.
    pub fn api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = Some(timeout);
        self
    }
    /// Sets the per-file timeout.
    pub fn file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = Some(timeout);
        self
    }

    /// Validates the settings and builds the final [`Config`].
    ///
    /// # Errors
    /// Returns `Error::Config` for a non-HTTP(S) base URL, a zero concurrency
    /// or batch size, or a zero timeout.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();

        let api_base_url = match self.api_base_url {
            Some(raw) => validate_base_url(&raw)?,
            None => defaults.api_base_url,
        };

        let config = Config {
            api_base_url,
            token: self.token,
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            cache_max_entries: self.cache_max_entries.unwrap_or(defaults.cache_max_entries),
            max_concurrent: self.max_concurrent.unwrap_or(defaults.max_concurrent),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            batch_delay: self.batch_delay.unwrap_or(defaults.batch_delay),
            api_timeout: self.api_timeout.unwrap_or(defaults.api_timeout),
            file_timeout: self.file_timeout.unwrap_or(defaults.file_timeout),
        };

        if config.max_concurrent == 0 {
            return Err(Error::Config("max concurrent requests must be at least 1".into()));
        }
        if config.batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".into()));
        }
        if config.api_timeout.is_zero() || config.file_timeout.is_zero() {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }

        log::debug!("Configuration built: {:?}", config);
        Ok(config)
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("invalid API base URL '{}': {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "API base URL must be an http(s) URL, got '{}'",
            raw
        )));
    }
    Ok(trimmed.to_string())
}
