// Integration tests for search functionality

use crate::common::{hit_paths, open_engine, open_store, test_search_config, TestWiki};
use gnosis::core::error::GnosisError;
use gnosis::core::search::QueryEngine;
use std::sync::Arc;

#[tokio::test]
async fn test_query_search_basic() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    let response = engine.query_search("eviction", 0, 0).unwrap();
    assert_eq!(
        hit_paths(&response),
        vec!["/wiki/ops/cache.md", "/wiki/ops/runbook.md"]
    );
    assert_eq!(response.total_hits, 2);
    assert!(response.results.iter().all(|hit| hit.body.is_none()));
    assert_eq!(response.results[0].score, 100.0);
    assert!(response.results[1].score <= 100.0);

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_boolean_and_phrase() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    let both = engine.query_search("cache AND restart", 0, 0).unwrap();
    assert_eq!(hit_paths(&both), vec!["/wiki/ops/runbook.md"]);

    let phrase = engine.query_search("\"shared cache\"", 0, 0).unwrap();
    assert_eq!(hit_paths(&phrase), vec!["/wiki/ops/cache.md"]);

    let title = engine.query_search("title:build", 0, 0).unwrap();
    assert_eq!(hit_paths(&title), vec!["/wiki/dev/build.md"]);

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_markdown_is_stripped() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    // "**release**" is indexed as plain "release"
    let response = engine.query_search("release", 0, 0).unwrap();
    assert_eq!(hit_paths(&response), vec!["/wiki/dev/build.md"]);

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_errors() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    let empty = engine.query_search("   ", 0, 0).unwrap_err();
    assert!(matches!(empty, GnosisError::InvalidQuery(_)));

    let bad_date = engine.query_search("modified:yesterday", 0, 0).unwrap_err();
    assert!(bad_date.is_bad_request());

    match engine.query_search("tags:ops", 0, 0) {
        Err(GnosisError::InvalidQueryField {
            field, suggestion, ..
        }) => {
            assert_eq!(field, "tags");
            assert!(suggestion.is_some());
        }
        other => panic!("expected InvalidQueryField, got {other:?}"),
    }

    let no_words = engine.fuzzy_search("!!!", &[], &[], 0, 0).unwrap_err();
    assert!(matches!(no_words, GnosisError::InvalidQuery(_)));

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_restricted_page_never_found() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    let response = engine.query_search("salaries", 0, 0).unwrap();
    assert_eq!(response.total_hits, 0);
    assert!(!engine.list_field("topic").unwrap().contains(&"secret".to_string()));

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_fuzzy_search_with_filters() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    // One edit away from "cache"
    let typo = engine.fuzzy_search("cahce", &[], &[], 0, 0).unwrap();
    assert!(hit_paths(&typo).contains(&"/wiki/ops/cache.md".to_string()));

    let by_bob = engine
        .fuzzy_search("", &[], &["bob".to_string()], 0, 0)
        .unwrap();
    assert_eq!(
        hit_paths(&by_bob),
        vec!["/wiki/dev/build.md", "/wiki/ops/cache.md"]
    );

    let ops_by_bob = engine
        .fuzzy_search("", &["ops".to_string()], &["Bob".to_string()], 0, 0)
        .unwrap();
    assert_eq!(hit_paths(&ops_by_bob), vec!["/wiki/ops/cache.md"]);

    let either_topic = engine
        .fuzzy_search("", &["dev".to_string(), "cache".to_string()], &[], 0, 0)
        .unwrap();
    assert_eq!(
        hit_paths(&either_topic),
        vec!["/wiki/dev/build.md", "/wiki/ops/cache.md"]
    );

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_fuzzy_search_previews_body() {
    let wiki = TestWiki::with_files(&[(
        "long.md",
        "# Long\n\nThe quick brown fox jumps over the lazy dog while the cache warms up slowly.",
    )]);
    let engine = open_engine(&wiki).await;

    let response = engine.fuzzy_search("fox", &[], &[], 0, 0).unwrap();
    let body = response.results[0].body.as_deref().unwrap();
    assert!(body.starts_with("The quick brown fox"));
    assert!(body.ends_with('…'));
    assert!(body.chars().count() <= test_search_config().body_preview_chars + 1);

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_list_field_and_values() {
    let wiki = TestWiki::small();
    let engine = open_engine(&wiki).await;

    assert_eq!(engine.list_field("topic").unwrap(), vec!["cache", "dev", "ops"]);
    assert_eq!(engine.list_field("author").unwrap(), vec!["ann-lee", "bob"]);
    assert_eq!(engine.list_field("keyword").unwrap(), vec!["pager"]);

    let ops = engine.list_field_values("topic", "ops", 0, 0).unwrap();
    assert_eq!(
        hit_paths(&ops),
        vec!["/wiki/ops/cache.md", "/wiki/ops/runbook.md"]
    );
    assert_eq!(ops.topics, vec!["cache", "dev", "ops"]);
    assert_eq!(ops.authors, vec!["ann-lee", "bob"]);

    let ann = engine.list_field_values("author", "Ann Lee", 0, 0).unwrap();
    assert_eq!(hit_paths(&ann), vec!["/wiki/ops/runbook.md"]);

    let path = engine
        .list_field_values("path", "/wiki/index.md", 0, 0)
        .unwrap();
    assert_eq!(path.results[0].title, "Welcome");

    let title = engine.list_field_values("title", "cache layer", 0, 0).unwrap();
    assert_eq!(hit_paths(&title), vec!["/wiki/ops/cache.md"]);

    assert!(engine.list_field_values("modified", "today", 0, 0).is_err());
    assert!(engine.list_field("nope").is_err());

    engine.store().close().await.unwrap();
}

#[tokio::test]
async fn test_pagination_walks_all_hits() {
    let files: Vec<(String, String)> = (0..8)
        .map(|i| (format!("page-{i}.md"), format!("# Page {i}\ncommon word")))
        .collect();
    let files: Vec<(&str, &str)> = files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect();
    let wiki = TestWiki::with_files(&files);
    let engine = open_engine(&wiki).await;

    let mut seen = Vec::new();
    for page in 0..3 {
        let response = engine.query_search("common", page, 0).unwrap();
        assert_eq!(response.total_hits, 8);
        assert_eq!(response.page_offset, page * 3);
        seen.extend(response.results.into_iter().map(|hit| hit.uri_path));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 8);

    let past_end = engine.query_search("common", 5, 0).unwrap();
    assert_eq!(past_end.total_hits, 8);
    assert!(past_end.results.is_empty());

    let far_past_end = engine.query_search("common", usize::MAX, 50).unwrap();
    assert_eq!(far_past_end.total_hits, 8);
    assert!(far_past_end.results.is_empty());

    let capped = engine.query_search("common", 0, 1000).unwrap();
    assert_eq!(capped.results.len(), 8);

    engine.store().close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_and_updates() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;
    let engine = Arc::new(QueryEngine::new(Arc::clone(&store), test_search_config()));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::task::spawn_blocking(move || {
            for _ in 0..20 {
                let response = engine.query_search("cache", 0, 0).unwrap();
                assert!(response.total_hits >= 2);
                assert!(!engine.list_field("author").unwrap().is_empty());
            }
            i
        }));
    }

    let writer = {
        let store = Arc::clone(&store);
        let file = wiki.write("ops/extra.md", "topic: ops\n# Extra\ncache notes");
        tokio::task::spawn_blocking(move || {
            for _ in 0..10 {
                store.update(&file, "/wiki/ops/extra.md").unwrap();
            }
        })
    };

    for task in tasks {
        task.await.unwrap();
    }
    writer.await.unwrap();

    let response = engine.query_search("cache", 0, 10).unwrap();
    assert_eq!(response.total_hits, 3);

    store.close().await.unwrap();
}
