//! Repository reference parsing and canonical form.
//!
//! Accepted inputs:
//! - `owner/repo`
//! - `owner/repo#tag`
//! - `https://github.com/owner/repo[#tag]` (also `http://`, `www.`, trailing `/` or `.git`)
//! - `github:owner/repo[#tag]`
//!
//! Owner and repository are lowercased. Tags are kept verbatim because git
//! tags are case-sensitive.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GitHubError, GitHubResult};

/// Prefix of the canonical identifier form.
pub const GITHUB_PREFIX: &str = "github:";

/// Tag assumed when a reference does not name one.
pub const DEFAULT_TAG: &str = "master";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i:https?://)?(?:(?i:www\.)?(?i:github\.com)/)?([^/#\s]+)/([^/#\s]+?)(?:\.git)?/?(?:#(.*))?$",
    )
    .expect("invalid regex")
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:https://)?github\.com/)?([^/\s]+/[^/#\s]+)(?:#(\w+))?$")
        .expect("invalid regex")
});

/// A parsed, normalized GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentifier {
    /// Lowercased owner (user or organization).
    pub owner: Option<String>,
    /// Lowercased `owner/repo`.
    pub full_name: String,
    /// Tag, branch or SHA, if the reference named one.
    pub tag: Option<String>,
}

impl RepoIdentifier {
    /// Parse a free-form repository reference.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::Unparsable`] if the input has no `owner/repo`
    /// segment. Callers usually treat that as "not a repository reference".
    pub fn parse(input: &str) -> GitHubResult<Self> {
        let trimmed = input.trim();
        let body = strip_github_prefix(trimmed).unwrap_or(trimmed);

        let unparsable = || GitHubError::Unparsable {
            input: input.to_string(),
        };
        let caps = IDENTIFIER.captures(body).ok_or_else(unparsable)?;

        let owner = caps.get(1).ok_or_else(unparsable)?.as_str().to_lowercase();
        let repo = caps.get(2).ok_or_else(unparsable)?.as_str().to_lowercase();
        let tag = caps
            .get(3)
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);

        Ok(Self {
            full_name: format!("{owner}/{repo}"),
            owner: Some(owner),
            tag,
        })
    }

    /// Build an identifier from a `owner/repo` name returned by the API.
    #[must_use]
    pub fn from_full_name(full_name: &str, tag: Option<String>) -> Self {
        let full_name = full_name.to_lowercase();
        let owner = full_name
            .split_once('/')
            .map(|(owner, _)| owner.to_string())
            .filter(|owner| !owner.is_empty());
        Self {
            owner,
            full_name,
            tag,
        }
    }

    /// The repository segment of the full name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.full_name
            .split_once('/')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }

    /// The tag, or [`DEFAULT_TAG`] when none was given.
    #[must_use]
    pub fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or(DEFAULT_TAG)
    }

    /// A copy with the tag defaulted to [`DEFAULT_TAG`].
    #[must_use]
    pub fn with_default_tag(&self) -> Self {
        Self {
            tag: Some(self.tag_or_default().to_string()),
            ..self.clone()
        }
    }

    /// The canonical `github:owner/repo#tag` string.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "{GITHUB_PREFIX}{}#{}",
            self.full_name.to_lowercase(),
            self.tag_or_default()
        )
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl std::str::FromStr for RepoIdentifier {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical `github:owner/repo#tag` form of an identifier.
#[must_use]
pub fn canonicalize(identifier: &RepoIdentifier) -> String {
    identifier.canonical()
}

/// Parse and canonicalize in one step; `None` if the input is not a reference.
#[must_use]
pub fn normalize(input: &str) -> Option<String> {
    RepoIdentifier::parse(input).ok().map(|id| id.canonical())
}

/// Whether the input uses the `github:` identifier form.
#[must_use]
pub fn is_github_id(input: &str) -> bool {
    strip_github_prefix(input).is_some()
}

/// A repository link as accepted in search queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLink {
    /// Lowercased `owner/repo`.
    pub repo: String,
    /// Optional word-character tag.
    pub tag: Option<String>,
}

impl RepoLink {
    /// Parse a search-query segment as a link.
    ///
    /// Stricter than [`RepoIdentifier::parse`]: no `github:` prefix and the
    /// tag must consist of word characters.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        let caps = LINK.captures(segment.trim())?;
        Some(Self {
            repo: caps.get(1)?.as_str().to_lowercase(),
            tag: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }

    /// `owner/repo[#tag]`, suitable for [`RepoIdentifier::parse`].
    #[must_use]
    pub fn path(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}#{tag}", self.repo),
            None => self.repo.clone(),
        }
    }
}

fn strip_github_prefix(input: &str) -> Option<&str> {
    let head = input.get(..GITHUB_PREFIX.len())?;
    if head.eq_ignore_ascii_case(GITHUB_PREFIX) {
        input.get(GITHUB_PREFIX.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_owner_repo() {
        let id = RepoIdentifier::parse("Microsoft/pxt-Sample").unwrap();
        assert_eq!(id.owner.as_deref(), Some("microsoft"));
        assert_eq!(id.full_name, "microsoft/pxt-sample");
        assert_eq!(id.tag, None);
    }

    #[test]
    fn parse_keeps_tag_case() {
        let id = RepoIdentifier::parse("octocat/Hello-World#V1.0-RC").unwrap();
        assert_eq!(id.full_name, "octocat/hello-world");
        assert_eq!(id.tag.as_deref(), Some("V1.0-RC"));
    }

    #[test]
    fn parse_url_forms() {
        for input in [
            "https://github.com/Octocat/Hello-World",
            "http://www.github.com/octocat/hello-world/",
            "github.com/octocat/hello-world.git",
        ] {
            let id = RepoIdentifier::parse(input).unwrap();
            assert_eq!(id.full_name, "octocat/hello-world", "input: {input}");
            assert_eq!(id.tag, None);
        }
        let id = RepoIdentifier::parse("https://github.com/octocat/hello-world#v2").unwrap();
        assert_eq!(id.tag.as_deref(), Some("v2"));
    }

    #[test]
    fn www_only_counts_before_github_host() {
        let id = RepoIdentifier::parse("www.example/repo").unwrap();
        assert_eq!(id.owner.as_deref(), Some("www.example"));
        assert_eq!(id.full_name, "www.example/repo");

        let id = RepoIdentifier::parse("WWW.GitHub.com/octocat/hello-world").unwrap();
        assert_eq!(id.full_name, "octocat/hello-world");
    }

    #[test]
    fn parse_github_prefix_case_insensitive() {
        let id = RepoIdentifier::parse("GitHub:octocat/hello-world#feature/x").unwrap();
        assert_eq!(id.full_name, "octocat/hello-world");
        assert_eq!(id.tag.as_deref(), Some("feature/x"));
    }

    #[test]
    fn empty_tag_is_none() {
        let id = RepoIdentifier::parse("octocat/hello-world#").unwrap();
        assert_eq!(id.tag, None);
    }

    #[test]
    fn unparsable_inputs() {
        for input in ["", "hello", "github:", "a/b/c/d", "two words/repo", "/repo"] {
            let err = RepoIdentifier::parse(input).unwrap_err();
            assert!(
                matches!(err, GitHubError::Unparsable { .. }),
                "input: {input}"
            );
        }
    }

    #[test]
    fn canonical_defaults_tag() {
        let id = RepoIdentifier::parse("Octocat/Hello-World").unwrap();
        assert_eq!(canonicalize(&id), "github:octocat/hello-world#master");
        assert_eq!(id.to_string(), "github:octocat/hello-world#master");
    }

    #[test]
    fn canonical_round_trip_is_idempotent() {
        for input in [
            "octocat/hello-world",
            "Octocat/Hello-World#v1.2.3",
            "github:pxt/Core#Feature/Branch",
            "https://github.com/a/b#c",
        ] {
            let once = canonicalize(&RepoIdentifier::parse(input).unwrap());
            let twice = canonicalize(&RepoIdentifier::parse(&once).unwrap());
            assert_eq!(once, twice, "input: {input}");
        }
    }

    #[test]
    fn normalize_and_is_github_id() {
        assert_eq!(
            normalize("octocat/hello-world#v1").as_deref(),
            Some("github:octocat/hello-world#v1")
        );
        assert_eq!(normalize("not a repo"), None);
        assert!(is_github_id("github:a/b"));
        assert!(is_github_id("GITHUB:a/b"));
        assert!(!is_github_id("a/b"));
    }

    #[test]
    fn name_and_default_tag() {
        let id = RepoIdentifier::parse("octocat/hello-world").unwrap();
        assert_eq!(id.name(), "hello-world");
        assert_eq!(id.with_default_tag().tag.as_deref(), Some("master"));
    }

    #[test]
    fn from_full_name_lowercases() {
        let id = RepoIdentifier::from_full_name("Octocat/Hello", None);
        assert_eq!(id.owner.as_deref(), Some("octocat"));
        assert_eq!(id.full_name, "octocat/hello");

        let ownerless = RepoIdentifier::from_full_name("/hello", None);
        assert_eq!(ownerless.owner, None);
    }

    #[test]
    fn link_grammar() {
        let link = RepoLink::parse("https://github.com/Octocat/Hello-World#v1").unwrap();
        assert_eq!(link.repo, "octocat/hello-world");
        assert_eq!(link.tag.as_deref(), Some("v1"));
        assert_eq!(link.path(), "octocat/hello-world#v1");

        assert!(RepoLink::parse("octocat/hello-world").is_some());
        assert!(RepoLink::parse("github:octocat/hello-world").is_none());
        assert!(RepoLink::parse("neopixel strip").is_none());
        assert!(RepoLink::parse("octocat/hello-world#v1.0").is_none());
    }
}
