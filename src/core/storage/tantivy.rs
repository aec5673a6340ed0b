//! Tantivy integration for page indexing.
//!
//! This module wraps Tantivy operations for creating, opening,
//! writing and reading one wiki page index. Locking and lifecycle
//! live one level up in [`IndexStore`](super::IndexStore).

use crate::core::error::{GnosisError, Result};
use crate::core::types::IndexedDocument;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tantivy::collector::{Count, DocSetCollector, TopDocs};
use tantivy::query::{AllQuery, Query, TermQuery};
use tantivy::schema::*;
use tantivy::{
    DocSet, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term,
    TERMINATED,
};

/// Fields holding one value per metadata slug
pub const MULTI_VALUE_FIELDS: [&str; 3] = ["topic", "keyword", "author"];

/// Create the Tantivy schema for page indexing
///
/// Fields:
/// - title: Page title (analyzed with `analyzer` | STORED)
/// - path: URI path, the primary key (STRING | STORED)
/// - body: Plain text body (analyzed with `analyzer` | STORED)
/// - topic: One value per topic slug (STRING | STORED)
/// - keyword: One value per keyword slug (STRING | STORED)
/// - author: One value per author slug (STRING | STORED)
/// - modified: File modification time (Date | INDEXED | STORED)
pub fn create_schema(analyzer: &str) -> Schema {
    let mut builder = Schema::builder();

    let indexing = TextFieldIndexing::default()
        .set_tokenizer(analyzer)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let analyzed = TextOptions::default()
        .set_indexing_options(indexing)
        .set_stored();

    builder.add_text_field("title", analyzed.clone());
    builder.add_text_field("path", STRING | STORED);
    builder.add_text_field("body", analyzed);

    for name in MULTI_VALUE_FIELDS {
        builder.add_text_field(name, STRING | STORED);
    }

    builder.add_date_field("modified", INDEXED | STORED);

    builder.build()
}

/// Resolved schema fields
#[derive(Debug, Clone, Copy)]
pub struct PageFields {
    pub title: Field,
    pub path: Field,
    pub body: Field,
    pub topic: Field,
    pub keyword: Field,
    pub author: Field,
    pub modified: Field,
}

impl PageFields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| GnosisError::IndexWrite(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            title: field("title")?,
            path: field("path")?,
            body: field("body")?,
            topic: field("topic")?,
            keyword: field("keyword")?,
            author: field("author")?,
            modified: field("modified")?,
        })
    }
}

/// A stored field value as read back from the index
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Texts(Vec<String>),
    Date(DateTime<Utc>),
    /// A value of a type the page schema never writes
    Unexpected(String),
}

/// One hit with the stored values of the requested fields
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub score: f32,
    pub fields: BTreeMap<String, RawValue>,
}

/// Unshaped result of one search
#[derive(Debug, Clone, PartialEq)]
pub struct RawResults {
    pub total_hits: usize,
    pub max_score: f32,
    pub hits: Vec<RawHit>,
    /// Distinct values per requested facet field
    pub facets: BTreeMap<String, Vec<String>>,
    pub took: std::time::Duration,
}

/// Tantivy page index wrapper
pub struct PageIndex {
    index: Index,
    path: PathBuf,
    fields: PageFields,
    writer: IndexWriter,
    reader: IndexReader,
}

impl std::fmt::Debug for PageIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageIndex")
            .field("path", &self.path)
            .finish()
    }
}

impl PageIndex {
    /// Create a new, empty index at the given path
    pub fn create(index_dir: &Path, analyzer: &str) -> Result<Self> {
        let create_err = |message: String| GnosisError::IndexCreate {
            path: index_dir.to_path_buf(),
            message,
        };

        std::fs::create_dir_all(index_dir).map_err(|e| create_err(e.to_string()))?;

        let index = Index::create_in_dir(index_dir, create_schema(analyzer))
            .map_err(|e| create_err(format!("Failed to create index: {e}")))?;

        Self::from_index(index, index_dir).map_err(|e| create_err(e.to_string()))
    }

    /// Open an existing index
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir).map_err(|e| GnosisError::IndexOpen {
            path: index_dir.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_index(index, index_dir).map_err(|e| GnosisError::IndexOpen {
            path: index_dir.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Open the index at `index_dir`, creating it if there is none
    pub fn open_or_create(index_dir: &Path, analyzer: &str) -> Result<Self> {
        if index_dir.join("meta.json").exists() {
            let index = Self::open(index_dir)?;
            tracing::debug!("Opened existing index at {:?}", index_dir);
            Ok(index)
        } else {
            tracing::info!("Creating index at {:?} ({})", index_dir, analyzer);
            Self::create(index_dir, analyzer)
        }
    }

    fn from_index(index: Index, index_dir: &Path) -> Result<Self> {
        let fields = PageFields::resolve(&index.schema())?;

        // Create index writer (50MB heap)
        let writer = index
            .writer(50_000_000)
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to create writer: {e}")))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            index,
            path: index_dir.to_path_buf(),
            fields,
            writer,
            reader,
        })
    }

    /// Write a page, replacing any document with the same URI path
    pub fn upsert(&mut self, page: &IndexedDocument) -> Result<()> {
        let f = self.fields;
        let mut doc = TantivyDocument::default();
        doc.add_text(f.title, &page.title);
        doc.add_text(f.path, &page.uri_path);
        doc.add_text(f.body, &page.body);
        for topic in &page.topics {
            doc.add_text(f.topic, topic);
        }
        for keyword in &page.keywords {
            doc.add_text(f.keyword, keyword);
        }
        for author in &page.authors {
            doc.add_text(f.author, author);
        }
        doc.add_date(
            f.modified,
            tantivy::DateTime::from_timestamp_secs(page.modified.timestamp()),
        );

        self.writer
            .delete_term(Term::from_field_text(f.path, &page.uri_path));
        self.writer
            .add_document(doc)
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to add document: {e}")))?;

        self.commit()
    }

    /// Remove the document stored under `uri_path`
    ///
    /// Returns `false` without touching the index when no such
    /// document exists.
    pub fn remove(&mut self, uri_path: &str) -> Result<bool> {
        let term = Term::from_field_text(self.fields.path, uri_path);
        let searcher = self.reader.searcher();
        let existing = searcher
            .search(
                &TermQuery::new(term.clone(), IndexRecordOption::Basic),
                &Count,
            )
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to look up {uri_path}: {e}")))?;

        if existing == 0 {
            return Ok(false);
        }

        self.writer.delete_term(term);
        self.commit()?;
        Ok(true)
    }

    /// Remove every document whose URI path starts with `prefix`
    pub fn remove_prefix(&mut self, prefix: &str) -> Result<usize> {
        let paths = indexed_terms(&self.reader.searcher(), self.fields.path)?;
        let doomed: Vec<&String> = paths.iter().filter(|p| p.starts_with(prefix)).collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        for path in &doomed {
            self.writer
                .delete_term(Term::from_field_text(self.fields.path, path));
        }
        self.commit()?;
        Ok(doomed.len())
    }

    /// Commit pending writes and make them visible to searchers
    pub fn commit(&mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to commit: {e}")))?;
        self.reader
            .reload()
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to reload reader: {e}")))?;
        Ok(())
    }

    /// Run a query and read back the stored values of `fields`
    ///
    /// `max_score` is the score of the best hit overall, not just
    /// the best hit on the requested page. The distinct values of
    /// each field in `facets` are read from the same snapshot as
    /// the hits.
    pub fn search(
        &self,
        query: &dyn Query,
        fields: &[String],
        facets: &[String],
        offset: usize,
        limit: usize,
    ) -> Result<RawResults> {
        let start = Instant::now();
        let searcher = self.reader.searcher();
        let schema = self.index.schema();

        let requested = fields
            .iter()
            .map(|name| {
                schema
                    .get_field(name)
                    .map(|field| (name.clone(), field))
                    .map_err(|_| GnosisError::InvalidQuery(format!("Unknown field '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        let (best, total_hits) = searcher
            .search(query, &(TopDocs::with_limit(1), Count))
            .map_err(|e| GnosisError::InvalidQuery(format!("Search failed: {e}")))?;

        // Past the last hit there is nothing to collect, and the
        // offset collector would size its heap to `offset + limit`
        let mut hits = Vec::new();
        if offset < total_hits {
            let limit = limit.clamp(1, total_hits - offset);
            let top_docs = searcher
                .search(query, &TopDocs::with_limit(limit).and_offset(offset))
                .map_err(|e| GnosisError::InvalidQuery(format!("Search failed: {e}")))?;

            hits.reserve(top_docs.len());
            for (score, address) in top_docs {
                let doc: TantivyDocument = searcher.doc(address).map_err(|e| {
                    GnosisError::IndexRead(format!("Failed to retrieve document: {e}"))
                })?;

                let fields = requested
                    .iter()
                    .filter_map(|(name, field)| {
                        read_value(&doc, *field, name).map(|value| (name.clone(), value))
                    })
                    .collect();

                hits.push(RawHit { score, fields });
            }
        }

        let facets = facets
            .iter()
            .map(|name| Ok((name.clone(), self.distinct_values(&searcher, name)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(RawResults {
            total_hits,
            max_score: best.first().map(|(score, _)| *score).unwrap_or(0.0),
            hits,
            facets,
            took: start.elapsed(),
        })
    }

    /// Distinct stored values of a field across all live pages
    pub fn field_values(&self, name: &str) -> Result<Vec<String>> {
        self.distinct_values(&self.reader.searcher(), name)
    }

    fn distinct_values(&self, searcher: &Searcher, name: &str) -> Result<Vec<String>> {
        let schema = self.index.schema();
        let field = schema
            .get_field(name)
            .map_err(|_| GnosisError::InvalidQuery(format!("Unknown field '{name}'")))?;

        let untokenized = match schema.get_field_entry(field).field_type() {
            FieldType::Str(options) => options
                .get_indexing_options()
                .is_some_and(|indexing| indexing.tokenizer() == "raw"),
            _ => false,
        };

        if untokenized {
            indexed_terms(searcher, field)
        } else {
            stored_values(searcher, field)
        }
    }

    /// Number of live documents
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Release the writer, waiting for background merges to finish
    pub fn close(self) -> Result<()> {
        self.writer
            .wait_merging_threads()
            .map_err(|e| GnosisError::IndexWrite(format!("Failed to finish merges: {e}")))
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn fields(&self) -> PageFields {
        self.fields
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_value(doc: &TantivyDocument, field: Field, name: &str) -> Option<RawValue> {
    let values: Vec<_> = doc.get_all(field).collect();
    let first = values.first()?;

    if let Some(date) = first.as_datetime() {
        let secs = date.into_timestamp_secs();
        return Some(match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(date) => RawValue::Date(date),
            None => RawValue::Unexpected(format!("{secs}")),
        });
    }

    let texts: Option<Vec<String>> = values
        .iter()
        .map(|value| value.as_str().map(str::to_string))
        .collect();

    Some(match texts {
        Some(mut texts) if texts.len() == 1 => RawValue::Text(texts.remove(0)),
        Some(texts) => RawValue::Texts(texts),
        None => RawValue::Unexpected(format!("{name}: {first:?}")),
    })
}

/// Terms of an untokenized field that still occur in a live page
///
/// Deleted pages keep their terms until a merge, so each term's
/// postings are checked against the segment's alive bitset.
fn indexed_terms(searcher: &Searcher, field: Field) -> Result<Vec<String>> {
    let mut values = BTreeSet::new();

    for segment in searcher.segment_readers() {
        let inverted = segment
            .inverted_index(field)
            .map_err(|e| GnosisError::IndexRead(format!("Failed to read terms: {e}")))?;
        let alive = segment.alive_bitset();
        let mut terms = inverted.terms().stream()?;

        while terms.advance() {
            let live = match alive {
                None => terms.value().doc_freq > 0,
                Some(alive) => {
                    let mut postings =
                        inverted.read_postings_from_terminfo(terms.value(), IndexRecordOption::Basic)?;
                    let mut doc = postings.doc();
                    while doc != TERMINATED && !alive.is_alive(doc) {
                        doc = postings.advance();
                    }
                    doc != TERMINATED
                }
            };

            if live {
                if let Ok(text) = std::str::from_utf8(terms.key()) {
                    values.insert(text.to_string());
                }
            }
        }
    }

    Ok(values.into_iter().collect())
}

/// Stored values of a tokenized or non-text field, read page by page
fn stored_values(searcher: &Searcher, field: Field) -> Result<Vec<String>> {
    let addresses = searcher
        .search(&AllQuery, &DocSetCollector)
        .map_err(|e| GnosisError::IndexRead(format!("Failed to enumerate pages: {e}")))?;

    let mut values = BTreeSet::new();
    for address in addresses {
        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| GnosisError::IndexRead(format!("Failed to retrieve document: {e}")))?;
        for value in doc.get_all(field) {
            if let Some(text) = value.as_str() {
                values.insert(text.to_string());
            }
        }
    }

    Ok(values.into_iter().collect())
}
