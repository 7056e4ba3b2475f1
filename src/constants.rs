// src/constants.rs

use std::time::Duration;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Versioned media type requested from the provider.
pub const GITHUB_ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// `User-Agent` sent with every request (GitHub rejects requests without one).
pub const DEFAULT_USER_AGENT: &str = concat!("repo-explorer/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding an optional personal access token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL (e.g. GitHub Enterprise).
pub const API_URL_ENV_VAR: &str = "GITHUB_API_URL";

/// How long a cached API response stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on distinct cache keys.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;

/// Simultaneous file-content requests allowed by the request queue.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// Number of files fetched per batch by a bulk fetch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause inserted between batches of a bulk fetch.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(250);

/// Time budget for branch and tree lookups.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Time budget for a single file-content fetch.
pub const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(15);

/// Remaining quota at or below which a warning is logged.
pub const RATE_LIMIT_WARN_THRESHOLD: u64 = 10;

/// Placeholder shown instead of the content of a binary-looking file.
pub const BINARY_FILE_PLACEHOLDER: &str = "[Binary file - content not displayed]";

/// Prefix of the inline marker recorded for a file that failed to load.
pub const FILE_ERROR_MARKER_PREFIX: &str = "[Error loading file: ";
