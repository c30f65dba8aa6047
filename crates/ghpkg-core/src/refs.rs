//! Ref listing and ref-to-commit resolution.
//!
//! Resolution of a ref object is a bounded state machine:
//!
//! ```text
//! RefObject --commit--> Resolved
//!     |
//!     +--tag--> (one fetch) TagTarget --commit--> Resolved
//!     |                         |
//!     +--other--> BadRefType    +--other--> BadRefType
//! ```
//!
//! An annotated tag costs exactly one extra fetch; tags of tags are rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::identifier::RepoIdentifier;
use crate::policy::PolicyConfig;
use crate::types::{GitObject, GitRef, GitTag, OneOrMany};
use crate::version::version_cmp;

/// Namespace listed when none is given.
pub const DEFAULT_NAMESPACE: &str = "tags";

static FULL_SHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{40}$").expect("invalid regex"));

/// Whether the input is a full 40-character lowercase hex SHA.
#[must_use]
pub fn is_full_sha(input: &str) -> bool {
    FULL_SHA.is_match(input)
}

/// Refs of one namespace, ordered by version-aware name comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefsSnapshot {
    refs: Vec<(String, String)>,
    head: Option<String>,
}

impl RefsSnapshot {
    /// Build a snapshot from `(stripped name, sha)` pairs; sorts them.
    #[must_use]
    pub fn new(mut refs: Vec<(String, String)>, head: Option<String>) -> Self {
        refs.sort_by(|(a, _), (b, _)| version_cmp(a, b));
        Self { refs, head }
    }

    /// An empty snapshot (the repository or namespace does not exist).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `(name, sha)` pairs in version order.
    #[must_use]
    pub fn refs(&self) -> &[(String, String)] {
        &self.refs
    }

    /// Ref names in version order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.refs.iter().map(|(name, _)| name.clone()).collect()
    }

    /// SHA for a stripped ref name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.refs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, sha)| sha.as_str())
    }

    /// The greatest ref name by version order.
    #[must_use]
    pub fn latest(&self) -> Option<&str> {
        self.refs.last().map(|(name, _)| name.as_str())
    }

    /// Remote `HEAD` commit, when the source reports it.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Number of refs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether there are no refs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Strip `refs/<namespace>/` from a full ref name.
#[must_use]
pub fn strip_ref_prefix(name: &str) -> &str {
    name.strip_prefix("refs/")
        .and_then(|rest| rest.split_once('/'))
        .map_or(name, |(_, stripped)| stripped)
}

enum RefState {
    RefObject(GitObject),
    TagTarget(GitObject),
    Resolved(String),
}

impl GitHubClient {
    /// List refs in `namespace` (`tags` or `heads`) for `owner/repo`.
    ///
    /// A missing repository or namespace yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Propagates transport and non-404 HTTP failures.
    pub async fn list_refs(&self, full_name: &str, namespace: &str) -> GitHubResult<RefsSnapshot> {
        self.backend().list_refs(full_name, namespace).await
    }

    /// Names of the refs in `namespace`, in version order.
    ///
    /// # Errors
    ///
    /// See [`list_refs`](Self::list_refs).
    pub async fn list_ref_names(&self, full_name: &str, namespace: &str) -> GitHubResult<Vec<String>> {
        Ok(self.list_refs(full_name, namespace).await?.names())
    }

    /// Resolve a ref object to a commit SHA, following at most one annotated tag.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::BadRefType`] for anything that is not a commit
    /// or a tag of a commit, and propagates failures of the tag fetch.
    pub async fn resolve_ref_object(&self, object: &GitObject) -> GitHubResult<String> {
        let mut state = RefState::RefObject(object.clone());
        loop {
            state = match state {
                RefState::RefObject(obj) => match obj.kind.as_str() {
                    "commit" => RefState::Resolved(obj.sha),
                    "tag" => {
                        let url = self.trusted_api_url(&obj.url)?;
                        debug!(url = %url, "dereferencing annotated tag");
                        let tag: GitTag = self.get_json(&url).await?;
                        RefState::TagTarget(tag.object)
                    },
                    other => {
                        return Err(GitHubError::BadRefType {
                            kind: other.to_string(),
                            depth: 1,
                        });
                    },
                },
                RefState::TagTarget(obj) => {
                    if obj.kind == "commit" {
                        RefState::Resolved(obj.sha)
                    } else {
                        return Err(GitHubError::BadRefType {
                            kind: obj.kind,
                            depth: 2,
                        });
                    }
                },
                RefState::Resolved(sha) => return Ok(sha),
            };
        }
    }

    /// Resolve a tag, branch, or literal SHA to a commit SHA.
    ///
    /// A full 40-hex SHA is returned as-is without any request. Otherwise the
    /// name is tried as a tag, and if fetching the tag ref fails, as a branch.
    ///
    /// # Errors
    ///
    /// Propagates the branch lookup failure when neither ref exists, and any
    /// dereference failure of a ref that was found.
    pub async fn resolve_tag_or_sha(&self, full_name: &str, tag_or_sha: &str) -> GitHubResult<String> {
        if is_full_sha(tag_or_sha) {
            return Ok(tag_or_sha.to_string());
        }
        let git_ref = match self.fetch_exact_ref(full_name, "tags", tag_or_sha).await {
            Ok(found) => found,
            Err(e) => {
                debug!(repo = full_name, name = tag_or_sha, error = %e, "no such tag, trying branch");
                self.fetch_exact_ref(full_name, "heads", tag_or_sha).await?
            },
        };
        self.resolve_ref_object(&git_ref.object).await
    }

    /// Most recent version of a repository.
    ///
    /// The greatest tag by version order if there are tags; else the remote
    /// `HEAD` SHA if the source reports one; else the default branch resolved
    /// to a SHA. `None` when the input is not a reference or the repository
    /// is banned or missing.
    ///
    /// # Errors
    ///
    /// Propagates lookup and resolution failures.
    pub async fn latest_version(
        &self,
        input: &str,
        config: Option<&PolicyConfig>,
    ) -> GitHubResult<Option<String>> {
        let Ok(parsed) = RepoIdentifier::parse(input) else {
            return Ok(None);
        };
        let lookup = RepoIdentifier {
            tag: None,
            ..parsed
        };
        let Some(repo) = self.repo(&lookup, config).await? else {
            return Ok(None);
        };

        let refs = self.list_refs(&repo.full_name, DEFAULT_NAMESPACE).await?;
        if let Some(tag) = refs.latest() {
            return Ok(Some(tag.to_string()));
        }
        if let Some(head) = refs.head() {
            return Ok(Some(head.to_string()));
        }
        let sha = self
            .resolve_tag_or_sha(&repo.full_name, &repo.default_branch)
            .await?;
        Ok(Some(sha))
    }

    /// Fetch `refs/{namespace}/{name}` and insist on an exact match.
    ///
    /// GitHub answers a non-existent exact ref with the list of refs sharing
    /// the prefix; that counts as not found.
    async fn fetch_exact_ref(&self, full_name: &str, namespace: &str, name: &str) -> GitHubResult<GitRef> {
        let url = self.api_url(&format!("repos/{full_name}/git/refs/{namespace}/{name}"));
        let wanted = format!("refs/{namespace}/{name}");
        let refs: OneOrMany<GitRef> = self.get_json(&url).await?;
        refs.into_vec()
            .into_iter()
            .find(|r| r.name == wanted)
            .ok_or(GitHubError::Http {
                status: 404,
                url,
                body: format!("no exact match for {wanted}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sha_detection() {
        assert!(is_full_sha("0123456789abcdef0123456789abcdef01234567"));
        assert!(!is_full_sha("0123456789ABCDEF0123456789abcdef01234567"));
        assert!(!is_full_sha("abc123"));
        assert!(!is_full_sha("v1.0.0"));
    }

    #[test]
    fn strip_prefix_variants() {
        assert_eq!(strip_ref_prefix("refs/tags/v1.0"), "v1.0");
        assert_eq!(strip_ref_prefix("refs/heads/feature/x"), "feature/x");
        assert_eq!(strip_ref_prefix("HEAD"), "HEAD");
    }

    #[test]
    fn snapshot_sorts_by_version() {
        let snap = RefsSnapshot::new(
            vec![
                ("v2.0.0".into(), "b".into()),
                ("v10.0.0".into(), "c".into()),
                ("v1.0.0".into(), "a".into()),
            ],
            None,
        );
        assert_eq!(snap.names(), vec!["v1.0.0", "v2.0.0", "v10.0.0"]);
        assert_eq!(snap.latest(), Some("v10.0.0"));
        assert_eq!(snap.get("v2.0.0"), Some("b"));
        assert_eq!(snap.len(), 3);
        assert!(RefsSnapshot::empty().is_empty());
    }
}
