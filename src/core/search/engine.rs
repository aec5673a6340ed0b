//! Query engine over one index store.
//!
//! Builds [`SearchRequest`]s for the four query operations, runs
//! them under the store's read lock and shapes the results.

use std::sync::Arc;

use super::request::{QuerySpec, SearchRequest};
use super::response::shape_response;
use crate::core::config::SearchConfig;
use crate::core::error::Result;
use crate::core::storage::IndexStore;
use crate::core::types::SearchResponse;

/// Fields returned by query-string and field-value searches
const LISTING_FIELDS: [&str; 5] = ["path", "title", "topic", "author", "modified"];

/// Fields returned by fuzzy searches, body included for previews
const FUZZY_FIELDS: [&str; 6] = ["path", "title", "topic", "author", "modified", "body"];

/// Facets attached to every response
const FACET_FIELDS: [&str; 2] = ["topic", "author"];

/// Search operations for one index
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<IndexStore>,
    config: SearchConfig,
}

impl QueryEngine {
    pub fn new(store: Arc<IndexStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Query-string search over title and body
    ///
    /// Supports the engine's query syntax, including `field:value`
    /// prefixes for schema fields.
    pub fn query_search(&self, term: &str, page: usize, page_size: usize) -> Result<SearchResponse> {
        tracing::debug!("query_search: '{}' page {}", term, page);
        self.run(
            QuerySpec::QueryString(term.to_string()),
            &LISTING_FIELDS,
            page,
            page_size,
            None,
        )
    }

    /// Typo-tolerant search narrowed by topics and authors
    ///
    /// Empty `term`, `topics` and `authors` match every page. Bodies
    /// are cut down to the configured preview length.
    pub fn fuzzy_search(
        &self,
        term: &str,
        topics: &[String],
        authors: &[String],
        page: usize,
        page_size: usize,
    ) -> Result<SearchResponse> {
        tracing::debug!(
            "fuzzy_search: '{}' topics={:?} authors={:?} page {}",
            term,
            topics,
            authors,
            page
        );
        self.run(
            QuerySpec::Fuzzy {
                term: term.to_string(),
                topics: topics.to_vec(),
                authors: authors.to_vec(),
            },
            &FUZZY_FIELDS,
            page,
            page_size,
            Some(self.config.body_preview_chars),
        )
    }

    /// Distinct values of `field` across the index
    pub fn list_field(&self, field: &str) -> Result<Vec<String>> {
        self.store.field_values(field)
    }

    /// Every page whose `field` matches `value`
    pub fn list_field_values(
        &self,
        field: &str,
        value: &str,
        page_size: usize,
        page: usize,
    ) -> Result<SearchResponse> {
        self.run(
            QuerySpec::FieldValue {
                field: field.to_string(),
                value: value.to_string(),
            },
            &LISTING_FIELDS,
            page,
            page_size,
            None,
        )
    }

    fn run(
        &self,
        spec: QuerySpec,
        fields: &[&str],
        page: usize,
        page_size: usize,
        preview_chars: Option<usize>,
    ) -> Result<SearchResponse> {
        let request = SearchRequest::new(spec, fields, page, self.page_size(page_size))
            .with_facets(&FACET_FIELDS);
        let raw = self.store.query(&request)?;

        shape_response(raw, request.offset(), preview_chars)
    }

    /// Zero means the default size; anything else is capped
    fn page_size(&self, requested: usize) -> usize {
        let size = if requested == 0 {
            self.config.default_page_size
        } else {
            requested
        };
        size.clamp(1, self.config.max_page_size.max(1))
    }
}
