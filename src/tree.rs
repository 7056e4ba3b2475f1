//! Builds the hierarchical file tree from the provider's flat listing.

use crate::core_types::{EntryType, FileNode, MaxDepth, NodeKind, TreeEntry};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct DirBuilder {
    dirs: BTreeMap<String, DirBuilder>,
    files: BTreeSet<String>,
}

impl DirBuilder {
    fn dir(&mut self, components: &[&str]) -> &mut DirBuilder {
        components.iter().fold(self, |node, name| {
            node.dirs.entry((*name).to_string()).or_default()
        })
    }

    fn into_nodes(self, parent: &str) -> Vec<FileNode> {
        let join = |name: &str| {
            if parent.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", parent, name)
            }
        };

        let mut nodes = Vec::with_capacity(self.dirs.len() + self.files.len());
        for (name, child) in self.dirs {
            let path = join(&name);
            let children = child.into_nodes(&path);
            nodes.push(FileNode {
                name,
                path,
                kind: NodeKind::Directory,
                children: Some(children),
            });
        }
        for name in self.files {
            nodes.push(FileNode {
                path: join(&name),
                name,
                kind: NodeKind::File,
                children: None,
            });
        }
        nodes
    }
}

/// Builds root-level [`FileNode`]s from `entries`, bounded by `max_depth`.
///
/// Submodule (`commit`) entries are skipped. Missing intermediate directories
/// are created. A directory at the depth bound is kept with empty children.
/// Within each directory, subdirectories come first, then files, each sorted
/// by name.
///
/// # Examples
/// ```
/// use repo_explorer::core_types::{EntryType, MaxDepth, TreeEntry};
/// use repo_explorer::tree::{build_file_tree, flatten_file_paths};
///
/// let entry = |path: &str, entry_type| TreeEntry {
///     path: path.to_string(),
///     entry_type,
///     sha: String::new(),
///     mode: String::new(),
///     url: None,
///     size: None,
/// };
/// let tree = build_file_tree(
///     &[entry("README.md", EntryType::Blob), entry("src/lib.rs", EntryType::Blob)],
///     MaxDepth::Unlimited,
/// );
/// assert_eq!(tree[0].name, "src");
/// assert_eq!(flatten_file_paths(&tree), vec!["src/lib.rs", "README.md"]);
/// ```
pub fn build_file_tree(entries: &[TreeEntry], max_depth: MaxDepth) -> Vec<FileNode> {
    let mut root = DirBuilder::default();

    for entry in entries {
        if entry.entry_type == EntryType::Commit {
            log::debug!("Skipping submodule: {}", entry.path);
            continue;
        }
        let components: Vec<&str> = entry.path.split('/').filter(|c| !c.is_empty()).collect();
        let Some((leaf, parents)) = components.split_last() else {
            continue;
        };

        if !max_depth.allows(components.len()) {
            // Keep the ancestors that fit so the truncated directory shows up.
            if let MaxDepth::Limited(max) = max_depth {
                root.dir(&components[..max]);
            }
            continue;
        }

        let parent = root.dir(parents);
        match entry.entry_type {
            EntryType::Tree => {
                parent.dirs.entry((*leaf).to_string()).or_default();
            }
            _ => {
                parent.files.insert((*leaf).to_string());
            }
        }
    }

    root.into_nodes("")
}

/// Collects every file path of `nodes` in tree order.
pub fn flatten_file_paths(nodes: &[FileNode]) -> Vec<String> {
    let mut paths = Vec::new();
    collect_files(nodes, &mut paths);
    paths
}

fn collect_files(nodes: &[FileNode], paths: &mut Vec<String>) {
    for node in nodes {
        match &node.children {
            Some(children) => collect_files(children, paths),
            None => paths.push(node.path.clone()),
        }
    }
}

/// Number of files in `nodes`, at any depth.
pub fn count_files(nodes: &[FileNode]) -> usize {
    nodes
        .iter()
        .map(|node| match &node.children {
            Some(children) => count_files(children),
            None => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, entry_type: EntryType) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            entry_type,
            sha: "0".repeat(40),
            mode: "100644".to_string(),
            url: None,
            size: None,
        }
    }

    fn sample() -> Vec<TreeEntry> {
        vec![
            entry("README.md", EntryType::Blob),
            entry("src", EntryType::Tree),
            entry("src/main.rs", EntryType::Blob),
            entry("src/util", EntryType::Tree),
            entry("src/util/mod.rs", EntryType::Blob),
            entry("vendor/lib", EntryType::Commit),
            entry("docs", EntryType::Tree),
        ]
    }

    #[test]
    fn test_builds_ordered_hierarchy() {
        let tree = build_file_tree(&sample(), MaxDepth::Unlimited);
        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "src", "README.md"]);

        let src = &tree[1];
        assert!(src.is_dir());
        let src_children = src.children.as_ref().unwrap();
        assert_eq!(src_children[0].path, "src/util");
        assert_eq!(src_children[1].path, "src/main.rs");
        assert_eq!(src_children[1].children, None);

        // Empty directories survive as directories.
        assert_eq!(tree[0].children, Some(vec![]));
    }

    #[test]
    fn test_submodules_are_skipped() {
        let tree = build_file_tree(&sample(), MaxDepth::Unlimited);
        assert!(tree.iter().all(|n| n.name != "vendor"));
    }

    #[test]
    fn test_missing_intermediate_directories_are_created() {
        let tree = build_file_tree(&[entry("a/b/c.txt", EntryType::Blob)], MaxDepth::Unlimited);
        assert_eq!(tree[0].path, "a");
        let b = &tree[0].children.as_ref().unwrap()[0];
        assert_eq!(b.path, "a/b");
        assert_eq!(b.children.as_ref().unwrap()[0].path, "a/b/c.txt");
    }

    #[test]
    fn test_depth_limit_truncates() {
        let tree = build_file_tree(&sample(), MaxDepth::Limited(1));
        assert_eq!(flatten_file_paths(&tree), vec!["README.md"]);
        let src = tree.iter().find(|n| n.name == "src").unwrap();
        assert_eq!(src.children, Some(vec![]));

        let two = build_file_tree(&sample(), MaxDepth::Limited(2));
        assert_eq!(flatten_file_paths(&two), vec!["src/main.rs", "README.md"]);

        assert!(build_file_tree(&sample(), MaxDepth::Limited(0)).is_empty());
    }

    #[test]
    fn test_flatten_and_count() {
        let tree = build_file_tree(&sample(), MaxDepth::Unlimited);
        assert_eq!(
            flatten_file_paths(&tree),
            vec!["src/util/mod.rs", "src/main.rs", "README.md"]
        );
        assert_eq!(count_files(&tree), 3);
    }
}
