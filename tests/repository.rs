use blog_render::{LoadOutcome, PostListController, PostRepository, RepoError, TagAssigner};
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;

fn posts_body(ids: std::ops::RangeInclusive<u64>) -> String {
    json!(ids
        .map(|id| json!({"userId": 1, "id": id, "title": format!("t{id}"), "body": "b"}))
        .collect::<Vec<_>>())
    .to_string()
}

#[tokio::test]
async fn controller_over_http_scenario() {
    let server = MockServer::start();
    for (page, body) in [(1, posts_body(1..=6)), (2, posts_body(7..=12)), (3, posts_body(13..=15))] {
        server.mock(|when, then| {
            when.method(GET)
                .path("/posts")
                .query_param("_limit", "6")
                .query_param("_page", page.to_string());
            then.status(200).body(body);
        });
    }

    let repo = blog_render::http_repository(&server.url("/posts"), 6).unwrap();
    let first = repo.list_first_page().await.unwrap();
    let mut ctrl = PostListController::new(first, 6, TagAssigner::new(1));

    assert_eq!(ctrl.load_more(&repo).await, LoadOutcome::Appended(6));
    assert_eq!((ctrl.items().len(), ctrl.page(), ctrl.is_exhausted()), (12, 2, false));

    assert_eq!(ctrl.load_more(&repo).await, LoadOutcome::Exhausted(3));
    assert_eq!((ctrl.items().len(), ctrl.is_exhausted()), (15, true));

    assert_eq!(ctrl.load_more(&repo).await, LoadOutcome::Skipped);
}

#[tokio::test]
async fn error_taxonomy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/posts/404");
        then.status(404).body("{}");
    });
    server.mock(|when, then| {
        when.method(GET).path("/posts/500");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/posts/7");
        then.status(200).body(r#"{"id": "seven"}"#);
    });

    let repo = blog_render::http_repository(&server.url("/posts"), 6).unwrap();

    assert!(matches!(repo.get_by_id("404").await, Err(RepoError::NotFound { .. })));
    assert!(matches!(repo.get_by_id("500").await, Err(RepoError::Network { .. })));
    assert!(matches!(
        repo.get_by_id("7").await,
        Err(RepoError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn throttled_request_is_retried() {
    let server = MockServer::start();
    let throttled = server.mock(|when, then| {
        when.method(GET).path("/posts/1");
        then.status(429).header("Retry-After", "0");
    });

    let repo = blog_render::http_repository(&server.url("/posts"), 6).unwrap();
    let err = repo.get_by_id("1").await.unwrap_err();
    assert!(matches!(err, RepoError::Network { .. }));
    throttled.assert_hits(3);
}
