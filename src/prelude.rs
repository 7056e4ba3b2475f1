//! The `repo_explorer` prelude for convenient library usage.
//!
//! This module re-exports the most commonly used types, traits, and functions
//! from the `repo_explorer` library.
//!
//! # Example
//!
//! ```
//! use repo_explorer::prelude::*;
//! # fn main() -> Result<()> {
//!
//! let config = ConfigBuilder::new().max_concurrent(2).build()?;
//! let token = CancellationToken::new();
//! let repo = parse_repo_url("git@github.com:acme/widgets.git").unwrap();
//! assert_eq!(repo.to_string(), "acme/widgets");
//! # let _ = (config, token);
//! # Ok(())
//! # }
//! ```

pub use crate::cancellation::CancellationToken;
pub use crate::config::{Config, ConfigBuilder};
pub use crate::core_types::{
    AllFilesContent, FileNode, LoadedFile, MaxDepth, RepoData, RepoRef, RepoSession, TreeEntry,
};
pub use crate::errors::{Error, Result};
pub use crate::filtering::{is_binary_path, IgnoreMatcher};
pub use crate::git::{parse_repo_url, GitHubClient, HttpResponse, HttpTransport};
pub use crate::progress::{FetchStage, NoOpProgress, ProgressReporter};
pub use crate::service::{BatchOutcome, FileOutcome, RepositoryService};
pub use crate::tree::{build_file_tree, flatten_file_paths};
pub use crate::{run, ContentSelection, OutputDestination, RunRequest};
