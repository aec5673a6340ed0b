//! Gnosis - Search indexing for a markdown wiki
//!
//! Keeps a Tantivy full-text index in step with one or more
//! directories of markdown pages and answers the wiki's search
//! queries against it.
//!
//! # Architecture
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, xdg
//!   - indexer (page metadata, markdown cleanup, crawling, watching)
//!   - storage (Tantivy index, index lifecycle)
//!   - search (query building, engine, response shaping)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Page metadata (topics, keywords, authors) parsed from the page head
//! - Restricted topics kept out of the index
//! - Debounced live reindexing on filesystem changes
//! - Query-string, fuzzy and faceted field search

// Core domain logic (protocol-agnostic)
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{GnosisError, Result};
pub use core::services::Services;
pub use core::types::*;
