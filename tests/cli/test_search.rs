//! Tests for the search CLI commands
//!
//! Tests the search command handlers with various scenarios:
//! - Valid queries with results
//! - Invalid queries
//! - Index not found errors
//! - Output format variations

use crate::cli::test_helpers::create_cli_test_services;
use crate::common::TestWiki;
use gnosis::cli::commands::search::{execute_fuzzy, execute_query, FuzzyArgs, QueryArgs};
use gnosis::cli::OutputFormat;

fn query(text: &str, index: &str) -> QueryArgs {
    QueryArgs {
        query: text.to_string(),
        index: index.to_string(),
        page: 0,
        page_size: 0,
    }
}

#[tokio::test]
async fn test_query_search_human() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let result = execute_query(query("eviction", "wiki"), &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "search failed: {result:?}");

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_json() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let result = execute_query(query("cache", "wiki"), &services, OutputFormat::Json).await;
    assert!(result.is_ok());

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_unknown_index() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let err = execute_query(query("cache", "nope"), &services, OutputFormat::Human)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nope"));

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_query_search_invalid_field() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let err = execute_query(query("tag:ops", "wiki"), &services, OutputFormat::Human)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("tag"));

    services.close().await.unwrap();
}

#[tokio::test]
async fn test_fuzzy_search_with_topic() {
    let wiki = TestWiki::small();
    let services = create_cli_test_services(&wiki).await;

    let args = FuzzyArgs {
        term: "evction".to_string(),
        index: "wiki".to_string(),
        topic: vec!["ops".to_string()],
        author: vec![],
        page: 0,
        page_size: 2,
    };
    let result = execute_fuzzy(args, &services, OutputFormat::Json).await;
    assert!(result.is_ok());

    services.close().await.unwrap();
}
