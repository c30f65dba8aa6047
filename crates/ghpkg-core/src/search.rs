//! Repository discovery.
//!
//! A query made of `|`-separated repository links is answered by looking each
//! link up directly. Anything else goes to GitHub repository search, scoped
//! by the configured marker phrase.

use futures::future::join_all;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::client::GitHubClient;
use crate::error::GitHubResult;
use crate::identifier::{RepoIdentifier, RepoLink};
use crate::policy::{PolicyConfig, RepoStatus};
use crate::repo::RepoDescriptor;
use crate::transport::RepoMetadata;
use crate::types::SearchResults;

/// The segments of a `|`-separated query that parse as repository links.
#[must_use]
pub fn parse_links(query: &str) -> Vec<RepoLink> {
    query.split('|').filter_map(RepoLink::parse).collect()
}

impl GitHubClient {
    /// The free-text query sent to GitHub search.
    #[must_use]
    pub fn scoped_query(&self, query: &str) -> String {
        let scope = &self.settings().search;
        format!(
            "{query} in:name,description,readme \"for {}/{}\"",
            scope.marker, scope.platform_id
        )
    }

    /// Search for package repositories.
    ///
    /// Without a policy nothing is returned. Explicit links keep unknown
    /// repositories and drop banned ones; free-text results are limited to
    /// approved repositories, plus unknown ones when the policy allows
    /// unapproved packages. Failures yield an empty or partial list.
    pub async fn search(&self, query: &str, config: Option<&PolicyConfig>) -> Vec<RepoDescriptor> {
        let Some(config) = config else {
            return Vec::new();
        };

        let links = parse_links(query);
        if !links.is_empty() {
            return self.lookup_links(&links, config).await;
        }

        match self.search_repositories(query, config).await {
            Ok(found) => found,
            Err(e) => {
                warn!(query, error = %e, "repository search failed");
                Vec::new()
            },
        }
    }

    async fn lookup_links(&self, links: &[RepoLink], config: &PolicyConfig) -> Vec<RepoDescriptor> {
        let lookups = links.iter().map(|link| async move {
            let id = RepoIdentifier::parse(&link.path())?;
            self.repo(&id, Some(config)).await
        });
        join_all(lookups)
            .await
            .into_iter()
            .zip(links)
            .filter_map(|(result, link)| match result {
                Ok(found) => found,
                Err(e) => {
                    debug!(link = %link.path(), error = %e, "skipping link");
                    None
                },
            })
            .filter(|repo| repo.status != RepoStatus::Banned)
            .collect()
    }

    async fn search_repositories(
        &self,
        query: &str,
        config: &PolicyConfig,
    ) -> GitHubResult<Vec<RepoDescriptor>> {
        let encoded: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &self.scoped_query(query))
            .finish();
        let url = self.api_url(&format!("search/repositories?{encoded}"));
        let results: SearchResults = self.get_json(&url).await?;
        debug!(total = results.total_count, incomplete = results.incomplete_results, "search results");

        Ok(results
            .items
            .into_iter()
            .map(|item| {
                let id = RepoIdentifier::from_full_name(&item.full_name, None);
                let meta = RepoMetadata {
                    owner: id.owner,
                    full_name: id.full_name,
                    name: item.name,
                    description: item.description.unwrap_or_default(),
                    default_branch: item.default_branch,
                };
                RepoDescriptor::from_metadata(meta, None, Some(config))
            })
            .filter(|repo| config.admits_in_search(repo.status))
            .collect())
    }
}
