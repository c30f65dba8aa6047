//! Integration tests for repository search.

use ghpkg_core::{GitHubClient, Method, PolicyConfig, RepoStatus};
use ghpkg_test::{API_ROOT, MockTransport, direct_client, repo_json, repo_url, search_results};
use url::form_urlencoded;

fn search_url(client: &GitHubClient, query: &str) -> String {
    let encoded: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &client.scoped_query(query))
        .finish();
    format!("{API_ROOT}/search/repositories?{encoded}")
}

fn policy(allow_unapproved: bool) -> PolicyConfig {
    PolicyConfig {
        banned_orgs: vec!["evil".into()],
        approved_orgs: vec!["good".into()],
        allow_unapproved,
        ..PolicyConfig::default()
    }
}

/// Without a policy nothing is searched.
#[tokio::test]
async fn test_search_without_config_is_empty() {
    let mock = MockTransport::new();
    let found = direct_client(&mock).search("lights", None).await;
    assert!(found.is_empty());
    assert_eq!(mock.request_count(), 0);
}

/// The free-text query carries the marker scope.
#[test]
fn test_scoped_query_format() {
    let client = direct_client(&MockTransport::new());
    assert_eq!(
        client.scoped_query("neopixel"),
        "neopixel in:name,description,readme \"for ghpkg/core\""
    );
}

/// Explicit links keep unknown repositories and drop banned ones unfetched.
#[tokio::test]
async fn test_search_explicit_links() {
    let mock = MockTransport::new()
        .with_get_json(repo_url("someone/thing"), repo_json("someone/thing", "x", "main"))
        .with_get_json(repo_url("good/lib"), repo_json("good/lib", "y", "main"))
        .with_failure(Method::Get, repo_url("flaky/repo"), "timeout");
    let client = direct_client(&mock);

    let found = client
        .search(
            "someone/thing|https://github.com/evil/bad#v1|good/lib|flaky/repo|missing/repo",
            Some(&policy(false)),
        )
        .await;

    let names: Vec<(&str, RepoStatus)> = found
        .iter()
        .map(|r| (r.full_name.as_str(), r.status))
        .collect();
    assert_eq!(
        names,
        vec![("someone/thing", RepoStatus::Unknown), ("good/lib", RepoStatus::Approved)]
    );
    assert_eq!(mock.count_with_prefix(&repo_url("evil/bad")), 0);
}

/// Free-text results keep only approved repositories by default.
#[tokio::test]
async fn test_search_free_text_filters_by_status() {
    let client_probe = direct_client(&MockTransport::new());
    let url = search_url(&client_probe, "lights");
    let payload = search_results(vec![
        repo_json("Good/Lights", "approved", "main"),
        repo_json("Someone/Lights", "unknown", "main"),
        repo_json("Evil/Lights", "banned", "main"),
    ]);

    let mock = MockTransport::new().with_get_json(url.clone(), payload.clone());
    let strict = direct_client(&mock).search("lights", Some(&policy(false))).await;
    let names: Vec<&str> = strict.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["good/lights"]);

    let mock = MockTransport::new().with_get_json(url, payload);
    let open = direct_client(&mock).search("lights", Some(&policy(true))).await;
    let names: Vec<&str> = open.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["good/lights", "someone/lights"]);
}

/// Search failures become an empty result.
#[tokio::test]
async fn test_search_failure_is_empty() {
    let probe = direct_client(&MockTransport::new());
    let mock = MockTransport::new().with_response(
        Method::Get,
        search_url(&probe, "lights"),
        403,
        r#"{"message":"rate limited"}"#,
    );
    let found = direct_client(&mock).search("lights", Some(&policy(true))).await;
    assert!(found.is_empty());
    assert_eq!(mock.request_count(), 1);
}
