//! Serde types for GitHub and proxy JSON responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A git ref as returned by `GET /repos/{repo}/git/refs/...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    /// Full ref name, e.g. `refs/tags/v1.0.0`.
    #[serde(rename = "ref")]
    pub name: String,
    /// API URL of the ref itself.
    #[serde(default)]
    pub url: String,
    /// The object the ref points at.
    pub object: GitObject,
}

/// The target of a ref or annotated tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    /// Object SHA.
    pub sha: String,
    /// Object type: `commit`, `tag`, `tree` or `blob`.
    #[serde(rename = "type", default = "default_object_type")]
    pub kind: String,
    /// API URL of the object.
    #[serde(default)]
    pub url: String,
}

fn default_object_type() -> String {
    "commit".to_string()
}

impl GitObject {
    /// A commit object with no URL, as synthesized from proxy ref maps.
    #[must_use]
    pub fn commit(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            kind: "commit".to_string(),
            url: String::new(),
        }
    }
}

/// An annotated tag object (`GET /repos/{repo}/git/tags/{sha}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitTag {
    /// SHA of the tag object itself.
    #[serde(default)]
    pub sha: String,
    /// Tag name.
    #[serde(default)]
    pub tag: String,
    /// What the tag points at.
    pub object: GitObject,
}

/// The refs endpoint answers with a list for prefixes and a single object
/// for an exact ref.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single object.
    One(T),
    /// A list of objects.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flatten into a list.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Repository owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    /// Login name.
    #[serde(default)]
    pub login: String,
}

/// Repository as returned by `GET /repos/{repo}` and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Short repository name.
    #[serde(default)]
    pub name: String,
    /// `Owner/Repo` as cased on GitHub.
    pub full_name: String,
    /// Owner account.
    #[serde(default)]
    pub owner: RepoOwner,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default branch name.
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    crate::identifier::DEFAULT_TAG.to_string()
}

/// `GET /search/repositories` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    /// Total hit count.
    #[serde(default)]
    pub total_count: u64,
    /// Whether the search timed out server-side.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Matching repositories.
    #[serde(default)]
    pub items: Vec<Repo>,
}

/// Proxy `gh/{repo}/refs` response: every ref name (plus `HEAD`) to a SHA.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRefs {
    /// `refs/tags/v1` → sha, `HEAD` → sha.
    #[serde(default)]
    pub refs: BTreeMap<String, String>,
}

/// Proxy `gh/{repo}` metadata response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRepoMeta {
    /// Short repository name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default branch, when the proxy reports one.
    #[serde(default, alias = "default_branch", rename = "defaultBranch")]
    pub default_branch: Option<String>,
}

/// Gist create/update response.
#[derive(Debug, Clone, Deserialize)]
pub struct GistResponse {
    /// Gist id.
    #[serde(default)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ref_list_and_single() {
        let list: OneOrMany<GitRef> = serde_json::from_str(
            r#"[{"ref":"refs/tags/v1","url":"u","object":{"sha":"a","type":"commit","url":"c"}},
                {"ref":"refs/tags/v2","url":"u","object":{"sha":"b","type":"tag","url":"t"}}]"#,
        )
        .unwrap();
        assert_eq!(list.into_vec().len(), 2);

        let one: OneOrMany<GitRef> = serde_json::from_str(
            r#"{"ref":"refs/heads/main","object":{"sha":"c","type":"commit"}}"#,
        )
        .unwrap();
        let refs = one.into_vec();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "refs/heads/main");
        assert_eq!(refs[0].object.kind, "commit");
    }

    #[test]
    fn deserialize_repo_defaults() {
        let repo: Repo = serde_json::from_str(
            r#"{"name":"Hello","full_name":"Octo/Hello","owner":{"login":"Octo"}}"#,
        )
        .unwrap();
        assert_eq!(repo.default_branch, "master");
        assert!(repo.description.is_none());
    }

    #[test]
    fn proxy_meta_accepts_both_branch_spellings() {
        let a: ProxyRepoMeta =
            serde_json::from_str(r#"{"name":"x","defaultBranch":"main"}"#).unwrap();
        let b: ProxyRepoMeta =
            serde_json::from_str(r#"{"name":"x","default_branch":"trunk"}"#).unwrap();
        let c: ProxyRepoMeta = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(a.default_branch.as_deref(), Some("main"));
        assert_eq!(b.default_branch.as_deref(), Some("trunk"));
        assert_eq!(c.default_branch, None);
    }
}
