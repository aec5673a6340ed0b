//! Page indexing module.
//!
//! Turns wiki pages on disk into index documents and keeps the
//! index in step with the filesystem:
//!
//! - Metadata and title parsing for markdown pages
//! - Markdown to plain text conversion for the body
//! - File system walking filtered by extension
//! - Debounced live watching of each configured root

pub mod markdown;
pub mod metadata;
pub mod walker;
pub mod watcher;

pub use markdown::cleanup_markdown;
pub use metadata::{slugify, PageMetadata};
pub use walker::{uri_path, FileWalker};
pub use watcher::{DirectoryWatcher, IndexSink, WatchAction};
