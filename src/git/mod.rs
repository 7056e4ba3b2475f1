// src/git/mod.rs
//! Talks to GitHub for repository metadata, tree listings and file contents.
//!
//! This module provides functionality to:
//! - Resolve repository URLs to an owner/repository pair.
//! - Issue REST requests through a pluggable HTTP transport.
//! - Cache and coalesce those requests in [`GitHubClient`].

// Declare the sub-modules.
mod api;
mod transport;
mod url;

// Re-export the public-facing API.
pub use self::api::{decode_file_content, GitHubClient};
pub use self::transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use self::url::parse_repo_url;
