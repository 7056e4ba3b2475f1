//! Defines core data structures shared by the access layer and its callers.
//!
//! Repository identity (`RepoRef`, `RepoSession`), the provider's flat tree
//! listing (`TreeEntry`), the hierarchical view built from it (`FileNode`),
//! and the per-path content map accumulated by file fetches
//! (`AllFilesContent`).

use crate::constants::{BINARY_FILE_PLACEHOLDER, FILE_ERROR_MARKER_PREFIX};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a repository on the provider.
///
/// # Examples
///
/// ```
/// use repo_explorer::core_types::RepoRef;
///
/// let repo = RepoRef::new("acme", "widgets");
/// assert_eq!(repo.to_string(), "acme/widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// The account or organization owning the repository.
    pub owner: String,
    /// The repository name, without any `.git` suffix.
    pub repo: String,
}

impl RepoRef {
    /// Creates a `RepoRef` from its two parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A resolved exploration session: the URL the user gave plus the branch it
/// resolved to. Replaced wholesale on every new fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSession {
    /// The repository URL exactly as supplied.
    pub url: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// The branch whose tree was fetched (the repository's default branch).
    pub branch: String,
}

impl RepoSession {
    /// The owner/repo pair of this session.
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(self.owner.clone(), self.repo.clone())
    }
}

/// The kind of object a [`TreeEntry`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// A file.
    Blob,
    /// A directory.
    Tree,
    /// A submodule reference.
    Commit,
}

/// A single entry of the provider's recursive git-tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    /// What the entry points at.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Object SHA.
    pub sha: String,
    /// Git file mode (e.g., `100644`).
    pub mode: String,
    /// API URL of the object. Absent for submodules.
    #[serde(default)]
    pub url: Option<String>,
    /// Blob size in bytes. Only reported for blobs.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Whether a [`FileNode`] is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A leaf.
    File,
    /// A node with (possibly depth-truncated) children.
    Directory,
}

/// A node of the hierarchical file tree built from the flat listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// The last path component.
    pub name: String,
    /// Full path relative to the repository root.
    pub path: String,
    /// File or directory.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Ordered children for directories; `None` for files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    /// Returns `true` if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Depth bound applied when building the tree.
///
/// `Limited(1)` keeps only root-level entries. `Unlimited` is a distinct
/// variant rather than a large number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxDepth {
    /// No restriction.
    #[default]
    Unlimited,
    /// At most this many path components.
    Limited(usize),
}

impl MaxDepth {
    /// Maps the conventional integer encoding (negative = unlimited) to a `MaxDepth`.
    ///
    /// # Examples
    /// ```
    /// use repo_explorer::core_types::MaxDepth;
    ///
    /// assert_eq!(MaxDepth::from_signed(-1), MaxDepth::Unlimited);
    /// assert_eq!(MaxDepth::from_signed(2), MaxDepth::Limited(2));
    /// ```
    pub fn from_signed(depth: i64) -> Self {
        if depth < 0 {
            MaxDepth::Unlimited
        } else {
            MaxDepth::Limited(depth as usize)
        }
    }

    /// Returns `true` if a path with `components` components is within the bound.
    pub fn allows(&self, components: usize) -> bool {
        match self {
            MaxDepth::Unlimited => true,
            MaxDepth::Limited(max) => components <= *max,
        }
    }
}

/// The result of a successful `fetch_repo_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoData {
    /// The resolved session.
    pub session: RepoSession,
    /// Root-level nodes of the repository tree.
    pub file_tree: Vec<FileNode>,
}

/// What is known about one path's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedFile {
    /// Decoded text content.
    Text(String),
    /// The path looks binary; its content is not fetched.
    Binary,
    /// Fetching failed; carries the human-readable error message.
    Failed(String),
}

impl LoadedFile {
    /// Text form suitable for direct display: the content, the binary
    /// placeholder, or the inline error marker.
    ///
    /// # Examples
    /// ```
    /// use repo_explorer::core_types::LoadedFile;
    ///
    /// let failed = LoadedFile::Failed("Not found: README.md".to_string());
    /// assert_eq!(failed.display_text(), "[Error loading file: Not found: README.md]");
    /// ```
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            LoadedFile::Text(text) => Cow::Borrowed(text),
            LoadedFile::Binary => Cow::Borrowed(BINARY_FILE_PLACEHOLDER),
            LoadedFile::Failed(message) => {
                Cow::Owned(format!("{}{}]", FILE_ERROR_MARKER_PREFIX, message))
            }
        }
    }

    /// Returns `true` for content that does not need fetching again.
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadedFile::Failed(_))
    }
}

/// Path → content map accumulated across file fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllFilesContent {
    files: BTreeMap<String, LoadedFile>,
}

impl AllFilesContent {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a path.
    pub fn get(&self, path: &str) -> Option<&LoadedFile> {
        self.files.get(path)
    }

    /// Returns the decoded text for `path`, if it loaded as text.
    pub fn text(&self, path: &str) -> Option<&str> {
        match self.files.get(path) {
            Some(LoadedFile::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` if `path` holds text or a binary placeholder.
    pub fn is_settled(&self, path: &str) -> bool {
        self.files.get(path).is_some_and(LoadedFile::is_settled)
    }

    /// Records content for a path, replacing what was there.
    pub fn insert(&mut self, path: impl Into<String>, file: LoadedFile) {
        self.files.insert(path.into(), file);
    }

    /// Number of recorded paths, failures included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths whose fetch failed, in path order.
    pub fn failed_paths(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|(_, f)| matches!(f, LoadedFile::Failed(_)))
            .map(|(p, _)| p.as_str())
            .collect()
    }

    /// Iterates over all recorded paths in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LoadedFile)> {
        self.files.iter().map(|(p, f)| (p.as_str(), f))
    }
}

impl FromIterator<(String, LoadedFile)> for AllFilesContent {
    fn from_iter<I: IntoIterator<Item = (String, LoadedFile)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
