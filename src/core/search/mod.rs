//! Search module for wiki page queries.
//!
//! This module provides query-string, fuzzy and field-value search
//! over one index using Tantivy's BM25 ranking.

mod engine;
mod query;
mod request;
mod response;

pub use engine::QueryEngine;
pub use query::{build_query, validate_query_fields};
pub use request::{QuerySpec, SearchRequest};
pub use response::{shape_response, truncate_body};
