//! Handles parsing of GitHub repository URLs.

use crate::core_types::RepoRef;
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for HTTPS repository URLs: `https://github.com/owner/repo[.git][/]`
static GITHUB_HTTPS_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$").unwrap()
});

/// Regex for SSH repository specs: `git@github.com:owner/repo.git`
static GITHUB_SSH_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^git@github\.com:([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)\.git$").unwrap()
});

/// Parses a GitHub repository URL into its owner and repository name.
///
/// Accepted forms are `https://github.com/{owner}/{repo}`, the same with a
/// trailing `.git`, and `git@github.com:{owner}/{repo}.git`. Anything else
/// (other hosts, extra path segments, blob/tree links) yields `None`; this is
/// a classification, not a fallible operation.
///
/// # Examples
/// ```
/// use repo_explorer::git::parse_repo_url;
///
/// let parsed = parse_repo_url("https://github.com/rust-lang/cargo").unwrap();
/// assert_eq!(parsed.owner, "rust-lang");
/// assert_eq!(parsed.repo, "cargo");
///
/// let ssh = parse_repo_url("git@github.com:rust-lang/cargo.git").unwrap();
/// assert_eq!(ssh, parsed);
///
/// assert!(parse_repo_url("not a url").is_none());
/// assert!(parse_repo_url("https://gitlab.com/rust-lang/cargo").is_none());
/// ```
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let url = url.trim();
    let caps = GITHUB_HTTPS_URL_RE
        .captures(url)
        .or_else(|| GITHUB_SSH_URL_RE.captures(url))?;

    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();

    // "." and ".." match the character class but can never name a repository.
    if is_dot_segment(owner) || is_dot_segment(repo) {
        return None;
    }

    Some(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn is_dot_segment(segment: &str) -> bool {
    segment.chars().all(|c| c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str) -> Option<RepoRef> {
        Some(RepoRef {
            owner: owner.to_string(),
            repo: name.to_string(),
        })
    }

    #[test]
    fn test_parse_https_url() {
        assert_eq!(
            parse_repo_url("https://github.com/acme/widgets"),
            repo("acme", "widgets")
        );
    }

    #[test]
    fn test_parse_https_url_with_git_suffix() {
        assert_eq!(
            parse_repo_url("https://github.com/BurntSushi/ripgrep.git"),
            repo("BurntSushi", "ripgrep")
        );
    }

    #[test]
    fn test_parse_https_url_with_trailing_slash_and_whitespace() {
        assert_eq!(
            parse_repo_url("  https://github.com/acme/widgets/\n"),
            repo("acme", "widgets")
        );
    }

    #[test]
    fn test_parse_ssh_url() {
        assert_eq!(
            parse_repo_url("git@github.com:rust-lang/cargo.git"),
            repo("rust-lang", "cargo")
        );
    }

    #[test]
    fn test_repo_names_with_dots_are_kept() {
        // Only a trailing ".git" is stripped.
        assert_eq!(
            parse_repo_url("https://github.com/vercel/next.js"),
            repo("vercel", "next.js")
        );
        assert_eq!(
            parse_repo_url("git@github.com:vercel/next.js.git"),
            repo("vercel", "next.js")
        );
    }

    #[test]
    fn test_rejects_non_repository_inputs() {
        for input in [
            "not a url",
            "",
            "https://gitlab.com/acme/widgets",
            "http://github.com/acme/widgets",
            "https://github.com/acme",
            "https://github.com/acme/widgets/tree/main/src",
            "https://github.com/acme/widgets/blob/main/README.md",
            "git@github.com:acme/widgets",
            "git@gitlab.com:acme/widgets.git",
            "https://github.com/acme/wid gets",
            "https://github.com/../widgets",
        ] {
            assert_eq!(parse_repo_url(input), None, "input: {:?}", input);
        }
    }
}
