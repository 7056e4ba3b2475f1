//! The facade a UI calls to load a repository tree and its file contents.
//!
//! [`RepositoryService`] resolves the URL, looks up the default branch,
//! fetches and filters the tree, then loads file contents through the
//! request queue in fixed-size batches. Branch and tree lookups run under the
//! API time budget; every file fetch runs under its own file budget.

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::core_types::{
    AllFilesContent, EntryType, FileNode, LoadedFile, MaxDepth, RepoData, RepoRef, RepoSession,
};
use crate::errors::{Error, Result};
use crate::filtering::{is_binary_path, IgnoreMatcher};
use crate::git::{parse_repo_url, GitHubClient, HttpTransport};
use crate::progress::{FetchStage, ProgressReporter};
use crate::queue::RequestQueue;
use crate::tree::{build_file_tree, count_files, flatten_file_paths};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Result of a bulk content load.
///
/// `content` always holds everything gathered so far, including per-file
/// failures. `error` is set only when the load as a whole failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// The updated path → content map.
    pub content: AllFilesContent,
    /// `NoFilesLoaded` or `Interrupted`, if the load failed as a whole.
    pub error: Option<Error>,
}

/// Result of loading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// The updated path → content map.
    pub content: AllFilesContent,
    /// Why the file could not be loaded, if it could not.
    pub error: Option<Error>,
}

/// Orchestrates URL resolution, tree loading and bounded file fetching.
pub struct RepositoryService {
    client: Arc<GitHubClient>,
    queue: RequestQueue,
    config: Config,
}

impl RepositoryService {
    /// Creates a service talking to GitHub over HTTP.
    ///
    /// # Errors
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = GitHubClient::new(&config)?;
        Ok(Self::from_client(config, client))
    }

    /// Creates a service over a caller-supplied transport.
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let client = GitHubClient::with_transport(&config, transport)?;
        Ok(Self::from_client(config, client))
    }

    fn from_client(config: Config, client: GitHubClient) -> Self {
        Self {
            client: Arc::new(client),
            queue: RequestQueue::new(config.max_concurrent),
            config,
        }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying API client.
    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Resolves `url`, fetches the default branch's tree, drops ignored
    /// entries and builds the hierarchy bounded by `max_depth`.
    ///
    /// # Errors
    /// `InvalidUrl` if the URL does not name a repository, `Timeout` if a
    /// lookup exceeds the API budget, or the classified API error.
    #[tracing::instrument(level = "debug", skip_all, fields(url = %url))]
    pub async fn fetch_repo_data(
        &self,
        url: &str,
        max_depth: MaxDepth,
        ignore_patterns: &[String],
        progress: Option<Arc<dyn ProgressReporter>>,
    ) -> Result<RepoData> {
        let progress = progress.as_deref();
        let outcome = self
            .load_repo_data(url, max_depth, ignore_patterns, progress)
            .await;
        match &outcome {
            Ok(_) => report(progress, FetchStage::TreeReady),
            Err(e) => {
                log::debug!("Loading {} failed: {}", url, e);
                failed(progress);
            }
        }
        outcome
    }

    async fn load_repo_data(
        &self,
        url: &str,
        max_depth: MaxDepth,
        ignore_patterns: &[String],
        progress: Option<&dyn ProgressReporter>,
    ) -> Result<RepoData> {
        report(progress, FetchStage::ResolvingUrl);
        let repo = parse_repo_url(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;

        report(progress, FetchStage::ResolvingBranch);
        let branch = with_timeout(
            "resolving the default branch",
            self.config.api_timeout,
            self.client.get_default_branch(&repo),
        )
        .await?;
        log::info!("Repository {} uses default branch '{}'", repo, branch);

        report(progress, FetchStage::FetchingTree);
        let entries = with_timeout(
            "fetching the repository tree",
            self.config.api_timeout,
            self.client.get_tree(&repo, &branch),
        )
        .await?;

        let matcher = IgnoreMatcher::new(ignore_patterns);
        let total = entries.len();
        let kept: Vec<_> = entries
            .into_iter()
            .filter(|e| !matcher.is_ignored(&e.path, e.entry_type == EntryType::Tree))
            .collect();
        if kept.len() < total {
            log::debug!("Ignore patterns removed {} of {} entries", total - kept.len(), total);
        }

        let file_tree = build_file_tree(&kept, max_depth);
        log::info!("Built tree with {} file(s)", count_files(&file_tree));

        Ok(RepoData {
            session: RepoSession {
                url: url.to_string(),
                owner: repo.owner,
                repo: repo.repo,
                branch,
            },
            file_tree,
        })
    }

    /// Loads every text-looking file of `tree` that `current` does not hold as text.
    ///
    /// Files are fetched in batches of `batch_size`, pausing `batch_delay`
    /// between batches. A failed file is recorded as [`LoadedFile::Failed`]
    /// and retried on the next call. The load fails as a whole with
    /// `NoFilesLoaded` only if the tree has no fetchable files or none of them
    /// ends up as text, and with `Interrupted` if `token` is cancelled (the
    /// partial content is kept).
    #[tracing::instrument(level = "debug", skip_all, fields(owner = %session.owner, repo = %session.repo))]
    pub async fn fetch_all_files_content(
        &self,
        session: &RepoSession,
        tree: &[FileNode],
        current: &AllFilesContent,
        token: &CancellationToken,
        progress: Option<Arc<dyn ProgressReporter>>,
    ) -> BatchOutcome {
        let progress = progress.as_deref();
        let mut content = current.clone();

        let fetchable: Vec<String> = flatten_file_paths(tree)
            .into_iter()
            .filter(|path| !is_binary_path(path))
            .collect();
        if fetchable.is_empty() {
            log::info!("No fetchable files in {}/{}", session.owner, session.repo);
            failed(progress);
            return BatchOutcome {
                content,
                error: Some(Error::NoFilesLoaded),
            };
        }

        let pending: Vec<&str> = fetchable
            .iter()
            .map(String::as_str)
            .filter(|path| content.text(path).is_none())
            .collect();
        log::info!(
            "Fetching {} of {} file(s) ({} already loaded)",
            pending.len(),
            fetchable.len(),
            fetchable.len() - pending.len()
        );

        report(progress, FetchStage::FetchingFiles);
        let mut position = (fetchable.len() - pending.len()) as u64;
        if let Some(p) = progress {
            p.set_length(fetchable.len() as u64);
            p.set_position(position);
        }

        let repo = session.repo_ref();
        let batch_size = self.config.batch_size.max(1);

        for (index, batch) in pending.chunks(batch_size).enumerate() {
            if index > 0 && !self.pause_between_batches(token).await {
                return interrupted(content, progress);
            }
            if token.is_cancelled() {
                return interrupted(content, progress);
            }

            log::debug!("Batch {}: {} file(s)", index + 1, batch.len());
            let fetches = batch.iter().map(|path| {
                let repo = &repo;
                async move {
                    let outcome = self
                        .queue
                        .add(|| self.fetch_file(repo, path, &session.branch))
                        .await;
                    (*path, outcome)
                }
            });

            for (path, outcome) in futures::future::join_all(fetches).await {
                match outcome {
                    Ok(text) => content.insert(path, LoadedFile::Text(text)),
                    Err(e) => {
                        log::warn!("Failed to load '{}': {}", path, e);
                        content.insert(path, LoadedFile::Failed(e.to_string()));
                    }
                }
                position += 1;
                if let Some(p) = progress {
                    p.set_position(position);
                }
            }
        }

        let any_text = fetchable.iter().any(|path| content.text(path).is_some());
        if !any_text {
            failed(progress);
            return BatchOutcome {
                content,
                error: Some(Error::NoFilesLoaded),
            };
        }

        let failed = content.failed_paths().len();
        if failed > 0 {
            log::warn!("{} file(s) could not be loaded", failed);
        }
        if let Some(p) = progress {
            p.finish_with_message(FetchStage::FilesReady.to_string());
        }
        BatchOutcome {
            content,
            error: None,
        }
    }

    /// Loads one file, serving it from `current` when it is already settled.
    ///
    /// Binary-looking paths get the [`LoadedFile::Binary`] placeholder without
    /// a request. A failure is recorded in the returned content and reported
    /// in `error`.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path))]
    pub async fn fetch_single_file_content(
        &self,
        session: &RepoSession,
        path: &str,
        current: &AllFilesContent,
    ) -> FileOutcome {
        let mut content = current.clone();
        if content.is_settled(path) {
            log::debug!("Serving '{}' from loaded content", path);
            return FileOutcome {
                content,
                error: None,
            };
        }
        if is_binary_path(path) {
            content.insert(path, LoadedFile::Binary);
            return FileOutcome {
                content,
                error: None,
            };
        }

        let repo = session.repo_ref();
        match self
            .queue
            .add(|| self.fetch_file(&repo, path, &session.branch))
            .await
        {
            Ok(text) => {
                content.insert(path, LoadedFile::Text(text));
                FileOutcome {
                    content,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!("Failed to load '{}': {}", path, e);
                content.insert(path, LoadedFile::Failed(e.to_string()));
                FileOutcome {
                    content,
                    error: Some(e),
                }
            }
        }
    }

    /// Drops every cached response and forgets in-flight requests.
    ///
    /// Fetches already admitted to or waiting in the request queue still run
    /// to completion for their callers. Responses to requests issued before
    /// the clear are not written back to the cache.
    pub fn clear_cache(&self) {
        self.client.clear();
        log::info!("Repository cache cleared.");
    }

    async fn fetch_file(&self, repo: &RepoRef, path: &str, branch: &str) -> Result<String> {
        with_timeout(
            "fetching file content",
            self.config.file_timeout,
            self.client.get_file_content(repo, path, branch),
        )
        .await
    }

    /// Sleeps `batch_delay`, returning `false` if cancelled meanwhile.
    async fn pause_between_batches(&self, token: &CancellationToken) -> bool {
        if self.config.batch_delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.config.batch_delay) => true,
            _ = token.cancelled() => false,
        }
    }
}

fn report(progress: Option<&dyn ProgressReporter>, stage: FetchStage) {
    log::debug!("Stage: {:?}", stage);
    if let Some(p) = progress {
        p.set_stage(stage);
    }
}

/// Reports the failure and closes the reporter.
fn failed(progress: Option<&dyn ProgressReporter>) {
    report(progress, FetchStage::Failed);
    if let Some(p) = progress {
        p.finish_with_message(FetchStage::Failed.to_string());
    }
}

fn interrupted(content: AllFilesContent, progress: Option<&dyn ProgressReporter>) -> BatchOutcome {
    log::info!("File loading cancelled; keeping {} loaded path(s).", content.len());
    if let Some(p) = progress {
        p.finish_with_message("Cancelled.".to_string());
    }
    BatchOutcome {
        content,
        error: Some(Error::Interrupted),
    }
}

/// Races `operation` against `budget`. Losing the race only abandons the wait.
async fn with_timeout<T>(
    operation: &str,
    budget: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(budget, future).await {
        Ok(outcome) => outcome,
        Err(_) => {
            log::warn!("Timed out after {:?} while {}", budget, operation);
            Err(Error::Timeout {
                operation: operation.to_string(),
                after: budget,
            })
        }
    }
}
