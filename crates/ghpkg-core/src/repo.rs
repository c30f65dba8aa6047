//! Repository lookup with policy status attached.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::GitHubClient;
use crate::error::GitHubResult;
use crate::identifier::RepoIdentifier;
use crate::policy::{PolicyConfig, RepoStatus, classify};
use crate::transport::RepoMetadata;

/// A repository as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDescriptor {
    /// Lowercased owner.
    pub owner: Option<String>,
    /// Lowercased `owner/repo`.
    pub full_name: String,
    /// Tag carried over from the lookup input.
    pub tag: Option<String>,
    /// Short name as cased on GitHub.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Default branch.
    pub default_branch: String,
    /// Policy verdict.
    pub status: RepoStatus,
}

impl RepoDescriptor {
    /// Attach a tag and the policy verdict to fetched metadata.
    #[must_use]
    pub fn from_metadata(meta: RepoMetadata, tag: Option<String>, config: Option<&PolicyConfig>) -> Self {
        let id = RepoIdentifier {
            owner: meta.owner.clone(),
            full_name: meta.full_name.clone(),
            tag: tag.clone(),
        };
        Self {
            status: classify(Some(&id), config),
            owner: meta.owner,
            full_name: meta.full_name,
            tag,
            name: meta.name,
            description: meta.description,
            default_branch: meta.default_branch,
        }
    }

    /// The descriptor as an identifier.
    #[must_use]
    pub fn identifier(&self) -> RepoIdentifier {
        RepoIdentifier {
            owner: self.owner.clone(),
            full_name: self.full_name.clone(),
            tag: self.tag.clone(),
        }
    }
}

/// Proxy-hosted icon for an approved repository.
///
/// Other repositories get no icon, and neither does anything when no proxy
/// root is known.
#[must_use]
pub fn repo_icon_url(repo: &RepoDescriptor, proxy_root: Option<&str>) -> Option<String> {
    if repo.status != RepoStatus::Approved {
        return None;
    }
    let root = proxy_root?.trim_end_matches('/');
    Some(format!("{root}/gh/{}/icon", repo.full_name))
}

impl GitHubClient {
    /// Look up a repository.
    ///
    /// `None` when the repository is banned (no request is made) or does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Propagates transport and non-404 HTTP failures.
    pub async fn repo(
        &self,
        id: &RepoIdentifier,
        config: Option<&PolicyConfig>,
    ) -> GitHubResult<Option<RepoDescriptor>> {
        if classify(Some(id), config) == RepoStatus::Banned {
            info!(event = "github.repo.banned", repo = %id.full_name, "repository is banned");
            return Ok(None);
        }
        let meta = self.backend().repo_metadata(id).await?;
        Ok(meta.map(|meta| RepoDescriptor::from_metadata(meta, id.tag.clone(), config)))
    }
}
