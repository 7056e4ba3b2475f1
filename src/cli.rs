// src/cli.rs

use clap::Parser;

/// Explore a GitHub repository from the command line.
///
/// repo-explorer fetches a repository's file tree through the GitHub REST API
/// and prints it. With `--all` or `--file` it also fetches file contents and
/// assembles them into a single Markdown document, written to stdout, a file,
/// or the clipboard. Set GITHUB_TOKEN to raise the API rate limit or to read
/// private repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Repository URL: https://github.com/owner/repo or git@github.com:owner/repo.git
    pub url: String,

    // --- Tree Options ---
    /// Maximum tree depth to show and fetch (-1 for unlimited).
    #[arg(
        short = 'd',
        long,
        value_name = "N",
        default_value_t = -1,
        allow_negative_numbers = true
    )]
    pub depth: i64,

    /// Ignore files/directories matching these glob patterns (repeatable).
    /// A trailing '/' matches directories only; a pattern with '/' is matched from the root.
    #[arg(short = 'i', long = "ignore", value_name = "GLOB", num_args = 1..)]
    pub ignore_patterns: Option<Vec<String>>,

    // --- Content Options ---
    /// Fetch every text file and output the combined Markdown.
    #[arg(short = 'a', long, action = clap::ArgAction::SetTrue, conflicts_with = "files")]
    pub all: bool,

    /// Fetch only these files (repository-relative paths) and output them as Markdown.
    #[arg(short = 'f', long = "file", value_name = "PATH", num_args = 1..)]
    pub files: Option<Vec<String>>,

    // --- Output Options ---
    /// Write the output to this file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    #[cfg(feature = "clipboard")]
    /// Copy the output to the system clipboard instead of printing it.
    #[arg(short = 'p', long, action = clap::ArgAction::SetTrue, conflicts_with = "output_file")]
    pub paste: bool,

    // --- API Tuning ---
    /// Maximum simultaneous file requests.
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Files fetched per batch.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Pause between batches, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub batch_delay_ms: Option<u64>,

    /// Time budget for branch and tree lookups, in seconds.
    #[arg(long, value_name = "SECS")]
    pub api_timeout_secs: Option<u64>,

    /// Time budget for each file fetch, in seconds.
    #[arg(long, value_name = "SECS")]
    pub file_timeout_secs: Option<u64>,

    /// GitHub API base URL (e.g. for GitHub Enterprise). Overrides GITHUB_API_URL.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
}
