//! Defines library error types.
//!
//! This module provides the `Error` enum, which classifies every failure the
//! repository-data access layer can surface. The classification is kept
//! precise so that callers can tell "wait out the rate limit" apart from
//! "reduce scope" or "add a token".

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the repository-data access layer.
///
/// The enum is `Clone` because a single outcome of a coalesced request is
/// handed to every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input could not be resolved to a GitHub owner/repository pair.
    #[error("Invalid GitHub repository URL: '{0}'")]
    InvalidUrl(String),

    /// The provider answered 404 for the requested resource.
    #[error("Not found: {resource}")]
    NotFound {
        /// The API URL or repository path that was missing.
        resource: String,
    },

    /// The provider answered 403 and reported zero remaining quota.
    #[error("GitHub API rate limit exceeded{}", format_reset(.reset_at))]
    RateLimited {
        /// Unix timestamp (seconds) at which the quota resets, if reported.
        reset_at: Option<u64>,
    },

    /// The provider answered 403 while quota was still available.
    #[error("Access forbidden: {resource}")]
    Forbidden {
        /// The API URL that was refused.
        resource: String,
    },

    /// The provider rejected the configured credential (401).
    #[error("Invalid GitHub credential (401 Unauthorized)")]
    InvalidCredential,

    /// Any other non-success HTTP status.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Provider {
        /// The HTTP status code.
        status: u16,
        /// The provider's message, or the canonical reason phrase.
        message: String,
    },

    /// A client-side time budget elapsed before the provider answered.
    #[error("Timed out after {after:?} while {operation}")]
    Timeout {
        /// What was being waited for (e.g. "fetching repository tree").
        operation: String,
        /// The budget that elapsed.
        after: Duration,
    },

    /// A successful response carried a payload that could not be understood.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A batch fetch finished without a single usable file.
    #[error("No files could be loaded from the repository")]
    NoFilesLoaded,

    /// The HTTP transport failed before a response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The operation was cancelled by the user (e.g., Ctrl+C).
    #[error("Operation cancelled by user (Ctrl+C)")]
    Interrupted,

    /// A spawned request task failed to complete (panicked or was aborted).
    #[error("Internal error: {0}")]
    Internal(String),

    /// Invalid configuration settings.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn format_reset(reset_at: &Option<u64>) -> String {
    match reset_at {
        Some(ts) => format!(" (quota resets at unix time {})", ts),
        None => String::new(),
    }
}

impl Error {
    /// A short, user-facing suggestion for recovering from this error.
    ///
    /// # Examples
    /// ```
    /// use repo_explorer::errors::Error;
    ///
    /// let err = Error::RateLimited { reset_at: None };
    /// assert!(err.remedy().contains("GITHUB_TOKEN"));
    /// ```
    pub fn remedy(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => {
                "Use a URL like https://github.com/owner/repo or git@github.com:owner/repo.git."
            }
            Error::NotFound { .. } => {
                "Check the repository name and branch. Private repositories require a GITHUB_TOKEN."
            }
            Error::RateLimited { .. } => {
                "Wait for the rate limit to reset, or set GITHUB_TOKEN to raise the limit."
            }
            Error::Forbidden { .. } => {
                "Access was refused. Set GITHUB_TOKEN with access to this repository."
            }
            Error::InvalidCredential => "The configured GITHUB_TOKEN was rejected. Check or regenerate it.",
            Error::Provider { .. } | Error::Network(_) => "GitHub could not be reached reliably. Try again later.",
            Error::Timeout { .. } => {
                "The request took too long. Try a smaller depth, more ignore patterns, or fewer files."
            }
            Error::Decode(_) => "The provider returned unexpected data for this resource.",
            Error::NoFilesLoaded => "No readable files were found. Adjust ignore patterns or try again.",
            Error::Interrupted => "The operation was cancelled.",
            Error::Internal(_) => "An unexpected internal failure occurred. Try again.",
            Error::Config(_) => "Fix the configuration value and try again.",
        }
    }

    /// `true` for failures caused by provider quota, which a retry after a
    /// pause (or with a credential) can fix.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// `true` when a client-side time budget elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors related to clipboard operations.
#[cfg(feature = "clipboard")]
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The clipboard could not be opened.
    #[error("Failed to initialize clipboard: {0}")]
    Initialization(String),
    /// The clipboard refused the content.
    #[error("Failed to set clipboard content: {0}")]
    SetContent(String),
}
