//! GitHub payload fixtures and preconfigured clients.

use std::sync::Arc;

use serde_json::{Value, json};

use ghpkg_core::{ClientSettings, GitHubClient};

use crate::mocks::MockTransport;

/// API root used by test clients.
pub const API_ROOT: &str = "https://api.github.com";

/// Raw content root used by test clients.
pub const RAW_ROOT: &str = "https://raw.githubusercontent.com";

/// Proxy root used by proxy-mode test clients.
pub const PROXY_ROOT: &str = "https://proxy.test/api";

/// A deterministic 40-hex SHA.
#[must_use]
pub fn test_sha(seed: u8) -> String {
    format!("{seed:02x}").repeat(20)
}

/// Settings for a direct-mode client against the fixture roots.
#[must_use]
pub fn test_settings() -> ClientSettings {
    ClientSettings {
        api_root: API_ROOT.to_string(),
        raw_root: RAW_ROOT.to_string(),
        ..ClientSettings::default()
    }
}

/// A direct-mode client over `mock`.
#[must_use]
pub fn direct_client(mock: &MockTransport) -> GitHubClient {
    GitHubClient::with_transport(test_settings(), Arc::new(mock.clone()))
}

/// A proxy-mode client over `mock`.
#[must_use]
pub fn proxy_client(mock: &MockTransport) -> GitHubClient {
    let settings = ClientSettings {
        proxy_root: Some(PROXY_ROOT.to_string()),
        ..test_settings()
    };
    GitHubClient::with_transport(settings, Arc::new(mock.clone()))
}

/// `{API_ROOT}/repos/{full_name}`.
#[must_use]
pub fn repo_url(full_name: &str) -> String {
    format!("{API_ROOT}/repos/{full_name}")
}

/// URL of the exact ref `refs/{namespace}/{name}`.
#[must_use]
pub fn exact_ref_url(full_name: &str, namespace: &str, name: &str) -> String {
    format!("{API_ROOT}/repos/{full_name}/git/refs/{namespace}/{name}")
}

/// URL of a namespace listing.
#[must_use]
pub fn ref_list_url(full_name: &str, namespace: &str) -> String {
    format!("{API_ROOT}/repos/{full_name}/git/refs/{namespace}/?per_page=100")
}

/// URL of an annotated tag object.
#[must_use]
pub fn tag_object_url(full_name: &str, tag_sha: &str) -> String {
    format!("{API_ROOT}/repos/{full_name}/git/tags/{tag_sha}")
}

/// URL of a raw file at a commit.
#[must_use]
pub fn raw_file_url(full_name: &str, sha: &str, path: &str) -> String {
    format!("{RAW_ROOT}/{full_name}/{sha}/{path}")
}

/// `{PROXY_ROOT}/gh/{path}`.
#[must_use]
pub fn proxy_url(path: &str) -> String {
    format!("{PROXY_ROOT}/gh/{path}")
}

/// A ref pointing at a commit.
#[must_use]
pub fn commit_ref(full_name: &str, namespace: &str, name: &str, sha: &str) -> Value {
    json!({
        "ref": format!("refs/{namespace}/{name}"),
        "url": exact_ref_url(full_name, namespace, name),
        "object": {
            "sha": sha,
            "type": "commit",
            "url": format!("{API_ROOT}/repos/{full_name}/git/commits/{sha}"),
        },
    })
}

/// A tag ref pointing at an annotated tag object.
#[must_use]
pub fn annotated_tag_ref(full_name: &str, name: &str, tag_sha: &str) -> Value {
    json!({
        "ref": format!("refs/tags/{name}"),
        "url": exact_ref_url(full_name, "tags", name),
        "object": {
            "sha": tag_sha,
            "type": "tag",
            "url": tag_object_url(full_name, tag_sha),
        },
    })
}

/// A ref pointing at an object of arbitrary type.
#[must_use]
pub fn typed_ref(full_name: &str, namespace: &str, name: &str, sha: &str, kind: &str) -> Value {
    json!({
        "ref": format!("refs/{namespace}/{name}"),
        "url": exact_ref_url(full_name, namespace, name),
        "object": { "sha": sha, "type": kind, "url": "" },
    })
}

/// An annotated tag object pointing at `target_sha` of type `target_kind`.
#[must_use]
pub fn tag_object(tag_sha: &str, name: &str, target_sha: &str, target_kind: &str) -> Value {
    json!({
        "sha": tag_sha,
        "tag": name,
        "object": { "sha": target_sha, "type": target_kind, "url": "" },
    })
}

/// A `GET /repos/{repo}` payload.
#[must_use]
pub fn repo_json(full_name: &str, description: &str, default_branch: &str) -> Value {
    let (owner, name) = full_name.split_once('/').unwrap_or(("", full_name));
    json!({
        "name": name,
        "full_name": full_name,
        "owner": { "login": owner },
        "description": description,
        "default_branch": default_branch,
    })
}

/// A `GET /search/repositories` payload.
#[must_use]
pub fn search_results(items: Vec<Value>) -> Value {
    json!({
        "total_count": items.len(),
        "incomplete_results": false,
        "items": items,
    })
}

/// A proxy `gh/{repo}/refs` payload.
#[must_use]
pub fn proxy_refs(pairs: &[(&str, &str)]) -> Value {
    let refs: serde_json::Map<String, Value> = pairs
        .iter()
        .map(|(name, sha)| ((*name).to_string(), Value::String((*sha).to_string())))
        .collect();
    json!({ "refs": refs })
}

/// Manifest text declaring `files` and `test_files`.
#[must_use]
pub fn manifest_text(name: &str, files: &[&str], test_files: &[&str]) -> String {
    json!({
        "name": name,
        "version": "1.0.0",
        "files": files,
        "testFiles": test_files,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha_is_full_hex() {
        let sha = test_sha(0xab);
        assert_eq!(sha.len(), 40);
        assert!(ghpkg_core::is_full_sha(&sha));
    }

    #[test]
    fn repo_json_splits_owner() {
        let repo = repo_json("Octo/Hello", "hi", "main");
        assert_eq!(repo["owner"]["login"], "Octo");
        assert_eq!(repo["name"], "Hello");
    }
}
