//! Integration tests for the GitHub diff source.
//!
//! Uses wiremock to verify listing filters, per-PR diff fetches, header
//! shape, pagination cursors, and upstream error mapping.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digest_core::{DiffSource, Error};
use digest_source::{GitHubDiffSource, SourceConfig};

fn source_for(server: &MockServer, token: Option<&str>) -> GitHubDiffSource {
    let config = SourceConfig {
        api_base: server.uri(),
        owner: "octocat".to_string(),
        repo: "hello-world".to_string(),
        token: token.map(String::from),
        timeout_seconds: 5,
    };
    GitHubDiffSource::new(config).unwrap()
}

fn pull(number: u64, title: &str, merged: bool) -> serde_json::Value {
    json!({
        "number": number,
        "title": title,
        "merged_at": if merged { json!("2024-05-01T12:00:00Z") } else { json!(null) },
        "html_url": format!("https://github.com/octocat/hello-world/pull/{}", number),
        "state": "closed"
    })
}

#[tokio::test]
async fn test_fetch_page_keeps_only_merged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls"))
        .and(query_param("state", "closed"))
        .and(query_param("per_page", "3"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            pull(101, "Add retry logic", true),
            pull(100, "Abandoned refactor", false),
            pull(99, "Fix flaky test", true),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls/101"))
        .and(header("Accept", "application/vnd.github.v3.diff"))
        .respond_with(ResponseTemplate::new(200).set_body_string("diff --git a/retry.rs"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls/99"))
        .respond_with(ResponseTemplate::new(200).set_body_string("diff --git a/test.rs"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, None);
    let page = source.fetch_page(1, 3).await.unwrap();

    assert_eq!(page.diffs.len(), 2);
    assert_eq!(page.diffs[0].id, "101");
    assert_eq!(page.diffs[0].description, "Add retry logic");
    assert_eq!(page.diffs[0].diff, "diff --git a/retry.rs");
    assert_eq!(
        page.diffs[0].url,
        "https://github.com/octocat/hello-world/pull/101"
    );
    assert_eq!(page.diffs[1].id, "99");

    // Full listing page, so more pages may exist.
    assert_eq!(page.next_page, Some(2));
    assert_eq!(page.current_page, 1);
    assert_eq!(page.per_page, 3);
}

#[tokio::test]
async fn test_short_listing_ends_pagination() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([pull(50, "Last one", true)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls/50"))
        .respond_with(ResponseTemplate::new(200).set_body_string("diff"))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, None);
    let page = source.fetch_page(4, 10).await.unwrap();

    assert_eq!(page.diffs.len(), 1);
    assert_eq!(page.next_page, None);
    assert_eq!(page.current_page, 4);
}

#[tokio::test]
async fn test_diff_fetch_failure_degrades_to_empty_diff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([pull(7, "Broken diff", true)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, None);
    let page = source.fetch_page(1, 10).await.unwrap();

    assert_eq!(page.diffs.len(), 1);
    assert_eq!(page.diffs[0].id, "7");
    assert_eq!(page.diffs[0].diff, "");
}

#[tokio::test]
async fn test_listing_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "API rate limit exceeded",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, None);
    let result = source.fetch_page(1, 10).await;

    match result {
        Err(Error::Upstream { status, message }) => {
            assert_eq!(status, Some(403));
            assert!(message.contains("rate limit"));
        }
        other => panic!("Expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sends_user_agent_and_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octocat/hello-world/pulls"))
        .and(header("User-Agent", "diff-digest"))
        .and(header("Authorization", "Bearer gh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, Some("gh-token"));
    let page = source.fetch_page(1, 10).await.unwrap();

    assert!(page.diffs.is_empty());
    assert_eq!(page.next_page, None);
}
