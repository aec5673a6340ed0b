//! Indexer layer tests
//!
//! Page parsing against real files (including non-ASCII content) and
//! live reindexing through the directory watcher.

mod test_watcher;
