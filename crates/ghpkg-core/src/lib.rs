//! GitHub-backed package source resolution.
//!
//! Turns a repository reference (`owner/repo#tag`, a GitHub URL, or a
//! `github:` identifier) into a policy-checked, commit-pinned set of package
//! files:
//!
//! - [`RepoIdentifier`]: parsing and the canonical `github:owner/repo#tag` form
//! - [`PolicyConfig`] / [`classify`]: org and repo allow/deny lists
//! - [`GitHubClient`]: entry point for every network operation
//! - [`SourceBackend`]: the proxy and direct strategies behind one interface
//! - [`RefsSnapshot`]: version-ordered ref listings
//! - [`PackageSnapshot`]: files at a resolved commit, reused when unchanged
//! - [`RepoDescriptor`]: repository metadata with its policy verdict
//! - [`GistRequest`]: private gist publishing
//!
//! # Transport modes
//!
//! With a proxy root configured (and not disabled), repository data comes
//! from the caching proxy's bulk endpoints. Otherwise the client talks to the
//! GitHub REST API and downloads files from the raw-content host, pinning
//! every download to a resolved commit SHA.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod error;
pub mod gist;
pub mod identifier;
pub mod package;
pub mod policy;
pub mod refs;
pub mod repo;
pub mod search;
pub mod transport;
pub mod types;
pub mod version;

pub use client::{ClientSettings, GitHubClient, SearchScope};
pub use error::{GitHubError, GitHubResult};
pub use gist::{GistFile, GistRequest, gist_files_from_snapshot};
pub use identifier::{RepoIdentifier, RepoLink, canonicalize, is_github_id, normalize};
pub use package::{PackageManifest, PackageSnapshot, validate_package_path};
pub use policy::{PolicyConfig, RepoStatus, classify, repo_status};
pub use refs::{RefsSnapshot, is_full_sha};
pub use repo::{RepoDescriptor, repo_icon_url};
#[cfg(feature = "http")]
pub use transport::http::{ReqwestTransport, TransportOptions};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Method, RepoMetadata, SourceBackend, TransportMode,
};
pub use version::{sort_versions, version_cmp};
