//! `repo_explorer` is a library and command-line tool for browsing GitHub
//! repositories through the REST API, without cloning them.
//!
//! Given a repository URL it fetches the file tree, filters it with
//! gitignore-style globs, and loads file contents, either one at a time or
//! in rate-limit-friendly batches. Loaded files can be assembled into a single
//! Markdown document for tools that consume Markdown, such as Large Language
//! Models (LLMs).
//!
//! The core is the repository-data access layer:
//! 1.  **Resolve**: turn a URL into an owner/repository pair ([`git::parse_repo_url`]).
//! 2.  **Load the tree**: default branch, then the recursive tree listing,
//!     filtered and depth-bounded ([`RepositoryService::fetch_repo_data`]).
//! 3.  **Load content**: single files or every text file, with caching,
//!     request coalescing, per-request timeouts and bounded concurrency
//!     ([`RepositoryService::fetch_all_files_content`]).
//!
//! # Example: Library Usage
//!
//! ```no_run
//! use repo_explorer::core_types::{AllFilesContent, MaxDepth};
//! use repo_explorer::{CancellationToken, ConfigBuilder, RepositoryService};
//!
//! # #[tokio::main]
//! # async fn main() -> repo_explorer::errors::Result<()> {
//! let config = ConfigBuilder::from_env().build()?;
//! let service = RepositoryService::new(config)?;
//!
//! // 1. Resolve the repository and load its tree, skipping build output.
//! let data = service
//!     .fetch_repo_data(
//!         "https://github.com/rust-lang/cargo",
//!         MaxDepth::Unlimited,
//!         &["target/".to_string()],
//!         None,
//!     )
//!     .await?;
//!
//! // 2. Load every text file in batches.
//! let token = CancellationToken::new();
//! let outcome = service
//!     .fetch_all_files_content(&data.session, &data.file_tree, &AllFilesContent::new(), &token, None)
//!     .await;
//! println!("Loaded {} file(s)", outcome.content.len());
//! # Ok(())
//! # }
//! ```

// Make modules public if they contain public types used in the API
pub mod cache;
pub mod cancellation;
pub mod cli;
pub mod coalesce;
pub mod config;
pub mod constants;
pub mod core_types;
pub mod errors;
pub mod filtering;
pub mod git;
pub mod output;
pub mod prelude;
pub mod progress;
pub mod queue;
pub mod service;
pub mod signal;
pub mod tree;

// Re-export key public types for easier use as a library
pub use cancellation::CancellationToken;
pub use config::{Config, ConfigBuilder};
pub use output::writer::OutputDestination;
pub use service::{BatchOutcome, FileOutcome, RepositoryService};

use crate::cli::Cli;
use crate::core_types::{AllFilesContent, MaxDepth};
use crate::errors::Error;
use crate::progress::ProgressReporter;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Which file contents a run fetches after loading the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentSelection {
    /// Only print the tree.
    #[default]
    TreeOnly,
    /// Fetch every text file.
    All,
    /// Fetch these repository-relative paths.
    Files(Vec<String>),
}

/// Everything one CLI run needs besides the service itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// The repository URL.
    pub url: String,
    /// Depth bound for the tree.
    pub max_depth: MaxDepth,
    /// Gitignore-style patterns to drop from the tree.
    pub ignore_patterns: Vec<String>,
    /// What to fetch after the tree.
    pub selection: ContentSelection,
    /// Where output goes.
    pub destination: OutputDestination,
}

impl RunRequest {
    /// Builds a request from parsed command-line arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let selection = if cli.all {
            ContentSelection::All
        } else if let Some(files) = &cli.files {
            ContentSelection::Files(files.clone())
        } else {
            ContentSelection::TreeOnly
        };

        #[cfg(feature = "clipboard")]
        if cli.paste {
            return Self::with_destination(cli, selection, OutputDestination::Clipboard);
        }
        let destination = match &cli.output_file {
            Some(path) => OutputDestination::File(PathBuf::from(path)),
            None => OutputDestination::Stdout,
        };
        Self::with_destination(cli, selection, destination)
    }

    fn with_destination(
        cli: &Cli,
        selection: ContentSelection,
        destination: OutputDestination,
    ) -> Self {
        Self {
            url: cli.url.clone(),
            max_depth: MaxDepth::from_signed(cli.depth),
            ignore_patterns: cli.ignore_patterns.clone().unwrap_or_default(),
            selection,
            destination,
        }
    }
}

/// Executes one run: load the tree, then print it or fetch and print contents.
///
/// Output goes to `request.destination`. When a bulk load is cancelled, what
/// was fetched so far is still written before `Error::Interrupted` is returned.
///
/// # Errors
/// Library errors are returned wrapped in `anyhow::Error` and can be recovered
/// with `downcast_ref::<errors::Error>()`. Output I/O failures are returned as-is.
pub async fn run(
    service: &RepositoryService,
    request: &RunRequest,
    token: &CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
) -> Result<()> {
    let data = service
        .fetch_repo_data(
            &request.url,
            request.max_depth,
            &request.ignore_patterns,
            progress.clone(),
        )
        .await?;

    let (paths, content, failure) = match &request.selection {
        ContentSelection::TreeOnly => {
            if let Some(p) = &progress {
                p.finish();
            }
            let setup = output::writer::setup_output_writer(&request.destination)?;
            let mut writer = setup.writer;
            output::render_tree(&mut writer, &data.file_tree)?;
            return output::writer::finalize_output(
                writer,
                setup.clipboard_buffer,
                &request.destination,
            );
        }
        ContentSelection::All => {
            let outcome = service
                .fetch_all_files_content(
                    &data.session,
                    &data.file_tree,
                    &AllFilesContent::new(),
                    token,
                    progress,
                )
                .await;
            (tree::flatten_file_paths(&data.file_tree), outcome.content, outcome.error)
        }
        ContentSelection::Files(paths) => {
            let mut content = AllFilesContent::new();
            let mut first_error = None;
            for path in paths {
                if token.is_cancelled() {
                    first_error = Some(Error::Interrupted);
                    break;
                }
                let outcome = service
                    .fetch_single_file_content(&data.session, path, &content)
                    .await;
                content = outcome.content;
                if let Some(e) = outcome.error {
                    first_error.get_or_insert(e);
                }
            }
            let any_loaded = paths.iter().any(|p| content.is_settled(p));
            let failure = match first_error {
                Some(Error::Interrupted) => Some(Error::Interrupted),
                Some(e) if !any_loaded => Some(e),
                _ => None,
            };
            (paths.clone(), content, failure)
        }
    };

    if let Some(Error::NoFilesLoaded) = failure {
        return Err(Error::NoFilesLoaded.into());
    }

    let setup = output::writer::setup_output_writer(&request.destination)?;
    let mut writer = setup.writer;
    let written = output::write_markdown(&mut writer, &paths, &content)?;
    output::writer::finalize_output(writer, setup.clipboard_buffer, &request.destination)?;
    log::info!("Wrote {} file block(s).", written);

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
