// src/progress.rs

//! Defines a trait for reporting progress of repository loads.
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// The coarse stages of loading a repository and its files.
///
/// Stage notifications are advisory; they never affect whether an operation
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// Parsing the repository URL.
    ResolvingUrl,
    /// Looking up the default branch.
    ResolvingBranch,
    /// Fetching and filtering the recursive tree listing.
    FetchingTree,
    /// The tree is built and ready to display.
    TreeReady,
    /// File contents are being fetched.
    FetchingFiles,
    /// Every requested file has been attempted.
    FilesReady,
    /// The operation failed.
    Failed,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchStage::ResolvingUrl => "Resolving repository URL...",
            FetchStage::ResolvingBranch => "Resolving default branch...",
            FetchStage::FetchingTree => "Fetching file tree...",
            FetchStage::TreeReady => "File tree ready.",
            FetchStage::FetchingFiles => "Fetching file contents...",
            FetchStage::FilesReady => "File contents ready.",
            FetchStage::Failed => "Failed.",
        };
        f.write_str(label)
    }
}

/// A trait for reporting progress, abstracting over specific implementations like `indicatif`.
///
/// # Examples
///
/// ```
/// use repo_explorer::progress::{FetchStage, ProgressReporter};
/// use std::sync::Mutex;
///
/// // A mock reporter that just stores the last message.
/// struct MockProgress {
///     last_message: Mutex<String>,
/// }
/// impl ProgressReporter for MockProgress {
///     fn set_length(&self, _len: u64) {}
///     fn set_position(&self, _pos: u64) {}
///     fn set_message(&self, msg: String) {
///         *self.last_message.lock().unwrap() = msg;
///     }
///     fn finish(&self) {}
///     fn finish_with_message(&self, msg: String) {
///         *self.last_message.lock().unwrap() = msg;
///     }
/// }
///
/// let reporter = MockProgress { last_message: Mutex::new("".to_string()) };
/// reporter.set_stage(FetchStage::FetchingTree);
/// assert_eq!(*reporter.last_message.lock().unwrap(), "Fetching file tree...");
/// reporter.finish_with_message("Done.".to_string());
/// assert_eq!(*reporter.last_message.lock().unwrap(), "Done.");
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Sets the total number of items to process.
    fn set_length(&self, len: u64);
    /// Sets the current position in the process.
    fn set_position(&self, pos: u64);
    /// Sets a descriptive message for the current operation (e.g., "Fetching file tree...").
    fn set_message(&self, msg: String);
    /// Finishes the progress reporting, hiding the progress bar.
    fn finish(&self);
    /// Finishes the progress reporting with a final message and hides the progress bar.
    fn finish_with_message(&self, msg: String);

    /// Announces a new stage. Defaults to showing the stage label as the message.
    fn set_stage(&self, stage: FetchStage) {
        self.set_message(stage.to_string());
    }
}

/// A `ProgressReporter` that does nothing.
///
/// This is used as a default or in non-interactive environments where a progress
/// bar is not desired.
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn set_length(&self, _len: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self) {}
    fn finish_with_message(&self, _msg: String) {}
}

/// An implementation of `ProgressReporter` using the `indicatif` crate.
///
/// Draws to stderr, so it never mixes with Markdown written to stdout.
#[cfg(feature = "progress")]
#[derive(Clone)]
pub struct IndicatifProgress {
    bar: ProgressBar,
}

#[cfg(feature = "progress")]
impl IndicatifProgress {
    /// Creates a new progress bar with a default style.
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        Self { bar: pb }
    }
}

#[cfg(feature = "progress")]
impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ProgressReporter for IndicatifProgress {
    fn set_length(&self, len: u64) {
        self.bar.set_length(len);
    }

    fn set_position(&self, pos: u64) {
        self.bar.set_position(pos);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self) {
        self.bar.finish();
    }

    fn finish_with_message(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}
