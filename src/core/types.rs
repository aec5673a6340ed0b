//! Core data types for the Gnosis indexing service.
//!
//! This module defines the data structures shared between the
//! indexer, the storage layer and the query engine: the document
//! written per page, crawl statistics and the shaped search
//! response handed to the web layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One wiki page as stored in the index
///
/// `uri_path` is the primary key: writing a document with an
/// existing `uri_path` replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub title: String,
    pub uri_path: String,

    /// Plain text body (markdown removed)
    pub body: String,

    pub topics: Vec<String>,
    pub keywords: Vec<String>,
    pub authors: Vec<String>,

    /// File modification time
    pub modified: DateTime<Utc>,
}

/// What an update did with a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    /// The page was written to the index
    Indexed,

    /// The page carries a restricted topic and was removed instead
    Excluded,
}

/// Statistics from crawling one watched root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages written to the index
    pub indexed: usize,

    /// Pages dropped for carrying a restricted topic
    pub excluded: usize,

    /// Files that failed to read or parse
    pub skipped: usize,

    /// Crawl duration in milliseconds
    pub duration_ms: u64,
}

/// A single shaped search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub uri_path: String,

    /// Relevance relative to the best hit, 0 to 100
    pub score: f64,

    pub topics: Vec<String>,
    pub keywords: Vec<String>,
    pub authors: Vec<String>,

    /// Body preview, only filled when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Paginated search response
///
/// Every response carries the full topic and author lists of the
/// index so the caller can render facet navigation next to any
/// kind of result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_hits: usize,
    pub max_score: f32,
    pub page_offset: usize,
    pub search_time: Duration,
    pub results: Vec<SearchHit>,
    pub topics: Vec<String>,
    pub authors: Vec<String>,
}
