//! Query construction for page searches.
//!
//! Turns a [`QuerySpec`] into a Tantivy query against one page
//! index. It also validates field prefixes in query-string input
//! so that users get a helpful error instead of a silent miss.

use crate::core::error::{GnosisError, Result};
use crate::core::indexer::metadata::slugify;
use crate::core::search::request::QuerySpec;
use crate::core::storage::PageIndex;
use once_cell::sync::Lazy;
use regex::Regex;
use tantivy::query::{
    AllQuery, BooleanQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, QueryParser, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TokenStream;
use tantivy::Term;

// Valid field names for the page schema
const VALID_FIELDS: [&str; 7] = [
    "title", "path", "body", "topic", "keyword", "author", "modified",
];

// Pattern to detect potential field prefixes (word:nonspace)
// We'll do additional validation in code to avoid look-behind
static FIELD_PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_]\w*):([^\s:])").unwrap());

/// Build the Tantivy query for `spec`
pub fn build_query(
    index: &PageIndex,
    spec: &QuerySpec,
    fuzzy_distance: u8,
) -> Result<Box<dyn Query>> {
    let fields = index.fields();

    match spec {
        QuerySpec::MatchAll => Ok(Box::new(AllQuery)),

        QuerySpec::QueryString(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(GnosisError::InvalidQuery(
                    "Query cannot be empty".to_string(),
                ));
            }
            validate_query_fields(text)?;

            let parser = QueryParser::for_index(index.index(), vec![fields.title, fields.body]);
            parser
                .parse_query(text)
                .map_err(|e| GnosisError::InvalidQuery(format!("Failed to parse query: {e}")))
        }

        QuerySpec::Fuzzy {
            term,
            topics,
            authors,
        } => {
            let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

            let words = analyze(index, fields.body, term)?;
            if words.is_empty() && !term.trim().is_empty() {
                return Err(GnosisError::InvalidQuery(format!(
                    "'{term}' contains no searchable words"
                )));
            }
            if !words.is_empty() {
                let per_word = words
                    .iter()
                    .map(|word| {
                        let either: Vec<(Occur, Box<dyn Query>)> = [fields.title, fields.body]
                            .into_iter()
                            .map(|field| {
                                let fuzzy = FuzzyTermQuery::new(
                                    Term::from_field_text(field, word),
                                    fuzzy_distance,
                                    true,
                                );
                                (Occur::Should, Box::new(fuzzy) as Box<dyn Query>)
                            })
                            .collect();
                        (
                            Occur::Must,
                            Box::new(BooleanQuery::new(either)) as Box<dyn Query>,
                        )
                    })
                    .collect();
                clauses.push((Occur::Must, Box::new(BooleanQuery::new(per_word))));
            }

            if let Some(query) = any_of(fields.topic, topics) {
                clauses.push((Occur::Must, query));
            }
            if let Some(query) = any_of(fields.author, authors) {
                clauses.push((Occur::Must, query));
            }

            if clauses.is_empty() {
                Ok(Box::new(AllQuery))
            } else {
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
        }

        QuerySpec::FieldValue { field, value } => field_value_query(index, field, value),
    }
}

/// Disjunction of exact slug matches, `None` when nothing to match
fn any_of(field: Field, values: &[String]) -> Option<Box<dyn Query>> {
    let terms: Vec<Term> = values
        .iter()
        .map(|value| slugify(value))
        .filter(|slug| !slug.is_empty())
        .map(|slug| Term::from_field_text(field, &slug))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(Box::new(BooleanQuery::new_multiterms_query(terms)))
    }
}

fn field_value_query(index: &PageIndex, name: &str, value: &str) -> Result<Box<dyn Query>> {
    let fields = index.fields();
    if value.trim().is_empty() {
        return Err(GnosisError::InvalidQuery(format!(
            "No value given for field '{name}'"
        )));
    }

    match name {
        "path" => Ok(exact(fields.path, value.trim())),
        "topic" => Ok(exact(fields.topic, &slugify(value))),
        "keyword" => Ok(exact(fields.keyword, &slugify(value))),
        "author" => Ok(exact(fields.author, &slugify(value))),
        "title" | "body" => {
            let field = if name == "title" {
                fields.title
            } else {
                fields.body
            };

            let mut terms: Vec<Term> = analyze(index, field, value)?
                .iter()
                .map(|word| Term::from_field_text(field, word))
                .collect();

            match terms.len() {
                0 => Err(GnosisError::InvalidQuery(format!(
                    "'{value}' has no searchable words"
                ))),
                1 => Ok(Box::new(TermQuery::new(
                    terms.remove(0),
                    IndexRecordOption::WithFreqs,
                ))),
                _ => Ok(Box::new(PhraseQuery::new(terms))),
            }
        }
        "modified" => Err(GnosisError::InvalidQuery(
            "Field 'modified' cannot be matched by value".to_string(),
        )),
        _ => Err(GnosisError::InvalidQuery(format!("Unknown field '{name}'"))),
    }
}

fn exact(field: Field, value: &str) -> Box<dyn Query> {
    Box::new(TermQuery::new(
        Term::from_field_text(field, value),
        IndexRecordOption::Basic,
    ))
}

/// Run `text` through the analyzer configured for `field`
///
/// Repeated words are kept once, in order of first appearance.
fn analyze(index: &PageIndex, field: Field, text: &str) -> Result<Vec<String>> {
    let mut analyzer = index
        .index()
        .tokenizer_for_field(field)
        .map_err(|e| GnosisError::InvalidQuery(format!("No analyzer for field: {e}")))?;

    let mut words: Vec<String> = Vec::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        let word = &stream.token().text;
        if !words.contains(word) {
            words.push(word.clone());
        }
    }
    Ok(words)
}

/// Validate that all field prefixes in a query are valid.
///
/// Returns an error if an invalid field prefix is detected, with helpful
/// suggestions for common mistakes.
///
/// # Examples
///
/// ```
/// use gnosis::core::search::validate_query_fields;
///
/// // Valid fields pass
/// assert!(validate_query_fields("topic:ops").is_ok());
/// assert!(validate_query_fields("title:restart").is_ok());
///
/// // Invalid fields return helpful errors
/// assert!(validate_query_fields("tag:ops").is_err());
/// ```
pub fn validate_query_fields(query: &str) -> Result<()> {
    // Skip validation if query is quoted (phrase query)
    let trimmed = query.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') {
        return Ok(());
    }

    for cap in FIELD_PREFIX_PATTERN.captures_iter(query) {
        let (Some(whole), Some(field), Some(value)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let field = field.as_str();

        // Only a prefix at the start or after whitespace names a field
        if let Some(prev) = query[..whole.start()].chars().next_back() {
            if !prev.is_whitespace() && prev != '(' && prev != '+' && prev != '-' {
                continue;
            }
        }

        if VALID_FIELDS.contains(&field) {
            continue;
        }

        // URL schemes look like field prefixes
        if matches!(field, "http" | "https" | "ftp" | "mailto") {
            continue;
        }

        let value_hint = query[value.start()..]
            .split_whitespace()
            .next()
            .unwrap_or("");
        let suggestion = suggest_field_alias(field);
        let message = match &suggestion {
            Some(valid) => format!("Did you mean '{valid}:{value_hint}'?"),
            None => format!("Valid fields are: {}", VALID_FIELDS.join(", ")),
        };

        return Err(GnosisError::InvalidQueryField {
            field: field.to_string(),
            message,
            valid_fields: VALID_FIELDS.iter().map(|s| s.to_string()).collect(),
            suggestion,
        });
    }

    Ok(())
}

/// Suggest a valid field name for common aliases.
fn suggest_field_alias(field: &str) -> Option<String> {
    match field.to_lowercase().as_str() {
        "tag" | "tags" | "category" | "topics" => Some("topic".to_string()),
        "meta" | "keywords" => Some("keyword".to_string()),
        "maintainer" | "authors" | "by" => Some("author".to_string()),
        "uri" | "url" | "file" | "filename" => Some("path".to_string()),
        "content" | "text" => Some("body".to_string()),
        "name" | "heading" | "subject" => Some("title".to_string()),
        _ => None,
    }
}
