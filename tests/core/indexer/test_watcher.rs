// Live reindexing tests
//
// Changes made after the initial crawl reach the index once the
// watched directory has been quiet for the debounce interval.

use crate::common::{eventually, open_store, wiki_section, TestWiki};
use gnosis::core::storage::IndexStore;
use std::sync::Arc;

fn has_path(store: &Arc<IndexStore>, uri: &str) -> bool {
    store
        .field_values("path")
        .map(|paths| paths.iter().any(|p| p == uri))
        .unwrap_or(false)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_initial_crawl_skips_restricted_and_foreign_files() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;

    assert_eq!(
        store.field_values("path").unwrap(),
        vec![
            "/wiki/dev/build.md",
            "/wiki/index.md",
            "/wiki/ops/cache.md",
            "/wiki/ops/runbook.md",
        ]
    );

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_page_is_indexed() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;

    wiki.write("ops/dns.md", "topic: ops\n# DNS\nresolver settings");

    let found = eventually(|| {
        let store = Arc::clone(&store);
        async move { has_path(&store, "/wiki/ops/dns.md") }
    })
    .await;
    assert!(found, "new page never reached the index");

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_removed_page_is_dropped() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;
    assert!(has_path(&store, "/wiki/dev/build.md"));

    wiki.remove("dev/build.md");

    let gone = eventually(|| {
        let store = Arc::clone(&store);
        async move { !has_path(&store, "/wiki/dev/build.md") }
    })
    .await;
    assert!(gone, "removed page is still indexed");

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_renamed_page_moves() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;

    std::fs::rename(
        wiki.path().join("ops/runbook.md"),
        wiki.path().join("ops/oncall.md"),
    )
    .unwrap();

    let moved = eventually(|| {
        let store = Arc::clone(&store);
        async move {
            has_path(&store, "/wiki/ops/oncall.md") && !has_path(&store, "/wiki/ops/runbook.md")
        }
    })
    .await;
    assert!(moved, "rename was not reflected in the index");

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_page_becoming_restricted_is_removed() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;
    assert!(has_path(&store, "/wiki/index.md"));

    wiki.write("index.md", "topic: Secret\n# Welcome\nnow private");

    let gone = eventually(|| {
        let store = Arc::clone(&store);
        async move { !has_path(&store, "/wiki/index.md") }
    })
    .await;
    assert!(gone, "restricted page is still indexed");

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_burst_of_edits_keeps_last_version() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;

    for i in 0..10 {
        wiki.write("ops/cache.md", &format!("# Cache v{i}\nrevision {i}"));
    }

    let latest = eventually(|| {
        let store = Arc::clone(&store);
        async move {
            store
                .field_values("title")
                .map(|titles| titles.iter().any(|t| t == "Cache v9"))
                .unwrap_or(false)
        }
    })
    .await;
    assert!(latest, "last edit never reached the index");
    assert_eq!(store.num_docs().unwrap(), 4);

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_changes_applied_after_close() {
    let wiki = TestWiki::small();
    let index_path = wiki.index_path();
    let store = open_store(&wiki).await;
    store.close().await.unwrap();

    wiki.write("late.md", "# Late\n");
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;

    // Reopen without watched roots so nothing new is crawled
    let mut section = wiki_section(&wiki);
    section.watch_dirs.clear();
    assert_eq!(section.index_path, index_path);

    let reopened = IndexStore::open(section, 1).await.unwrap();
    assert_eq!(reopened.num_docs().unwrap(), 4);
    reopened.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_hidden_directory_edits_stay_out() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;

    wiki.write(".drafts/wip.md", "# Work In Progress\n");
    wiki.write("ops/visible.md", "# Visible\n");

    let visible = eventually(|| {
        let store = Arc::clone(&store);
        async move { has_path(&store, "/wiki/ops/visible.md") }
    })
    .await;
    assert!(visible, "visible page never reached the index");
    assert!(!has_path(&store, "/wiki/.drafts/wip.md"));

    store.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_directory_moved_out_drops_its_pages() {
    let wiki = TestWiki::small();
    let store = open_store(&wiki).await;
    assert!(has_path(&store, "/wiki/ops/cache.md"));

    let outside = tempfile::tempdir().unwrap();
    std::fs::rename(wiki.path().join("ops"), outside.path().join("ops")).unwrap();

    let gone = eventually(|| {
        let store = Arc::clone(&store);
        async move {
            !has_path(&store, "/wiki/ops/cache.md") && !has_path(&store, "/wiki/ops/runbook.md")
        }
    })
    .await;
    assert!(gone, "pages of a moved directory are still indexed");
    assert!(has_path(&store, "/wiki/index.md"));

    store.close().await.unwrap();
}
