// Test helper functions

use super::fixtures::TestWiki;
use gnosis::core::config::{IndexSection, SearchConfig};
use gnosis::core::search::QueryEngine;
use gnosis::core::storage::IndexStore;
use gnosis::core::types::SearchResponse;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Index section over `wiki` with a short debounce
#[allow(dead_code)] // Used in integration tests
pub fn wiki_section(wiki: &TestWiki) -> IndexSection {
    let mut section = IndexSection::new("wiki", wiki.index_path()).watch(wiki.path(), "/wiki/");
    section.restricted = vec!["secret".to_string()];
    section.debounce_ms = 100;
    section
}

/// Open a store over `wiki` and wait for its first crawl
#[allow(dead_code)] // Used in integration tests
pub async fn open_store(wiki: &TestWiki) -> Arc<IndexStore> {
    let store = IndexStore::open(wiki_section(wiki), 1)
        .await
        .expect("Failed to open store");
    store.wait_until_crawled().await;
    store
}

/// Search settings small enough to exercise paging
#[allow(dead_code)] // Used in integration tests
pub fn test_search_config() -> SearchConfig {
    SearchConfig {
        default_page_size: 3,
        max_page_size: 10,
        body_preview_chars: 40,
        fuzzy_distance: 1,
    }
}

/// Open a query engine over `wiki`
#[allow(dead_code)] // Used in integration tests
pub async fn open_engine(wiki: &TestWiki) -> QueryEngine {
    QueryEngine::new(open_store(wiki).await, test_search_config())
}

/// URI paths of the hits in a response, sorted
#[allow(dead_code)] // Used in integration tests
pub fn hit_paths(response: &SearchResponse) -> Vec<String> {
    let mut paths: Vec<String> = response
        .results
        .iter()
        .map(|hit| hit.uri_path.clone())
        .collect();
    paths.sort();
    paths
}

/// Poll `check` until it holds or ten seconds pass
#[allow(dead_code)] // Used in integration tests
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
