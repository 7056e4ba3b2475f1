// src/filtering/ignore.rs

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    /// Pattern had a trailing `/`: only matches directories.
    dir_only: bool,
    /// Pattern contained a `/`: matched against the path from the root.
    anchored: bool,
}

/// Matches repository paths against gitignore-style glob patterns.
///
/// - `dist/` matches a directory named `dist` at any depth, and everything
///   below it.
/// - `*.log` (no slash) matches any path component.
/// - `docs/*.md` (with a slash) matches from the repository root, including
///   everything below a matching directory.
///
/// Empty patterns and `#` comments are skipped; invalid globs are logged and
/// skipped.
///
/// # Examples
/// ```
/// use repo_explorer::filtering::IgnoreMatcher;
///
/// let matcher = IgnoreMatcher::new(&["dist/".to_string(), "*.log".to_string()]);
/// assert!(matcher.is_ignored("dist/bundle.js", false));
/// assert!(matcher.is_ignored("logs/server.log", false));
/// assert!(!matcher.is_ignored("src/dist.rs", false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
}

impl IgnoreMatcher {
    /// Compiles `patterns` into a matcher.
    pub fn new(patterns: &[String]) -> Self {
        let rules = patterns
            .iter()
            .filter_map(|raw| {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }
                let dir_only = trimmed.ends_with('/');
                let body = trimmed.trim_end_matches('/');
                let anchored = body.contains('/');
                let body = body.trim_start_matches('/');
                if body.is_empty() {
                    return None;
                }
                match Pattern::new(body) {
                    Ok(pattern) => {
                        log::debug!("Compiled ignore glob: {}", raw);
                        Some(IgnoreRule {
                            pattern,
                            dir_only,
                            anchored,
                        })
                    }
                    Err(e) => {
                        log::warn!("Invalid ignore glob pattern '{}': {}", raw, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Returns `true` if no patterns survived compilation.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if `path` (a `/`-separated repository path) is ignored.
    ///
    /// `is_dir` tells whether the path itself is a directory.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        self.rules
            .iter()
            .any(|rule| rule_matches(rule, &components, is_dir))
    }
}

fn rule_matches(rule: &IgnoreRule, components: &[&str], is_dir: bool) -> bool {
    let last = components.len().saturating_sub(1);
    // A prefix (or component) that is not the whole path is always a directory.
    let eligible = |end: usize| !rule.dir_only || end < last || is_dir;

    if rule.anchored {
        (0..components.len()).any(|end| {
            eligible(end) && rule.pattern.matches_with(&components[..=end].join("/"), MATCH_OPTIONS)
        })
    } else {
        components
            .iter()
            .enumerate()
            .any(|(i, component)| eligible(i) && rule.pattern.matches_with(component, MATCH_OPTIONS))
    }
}
