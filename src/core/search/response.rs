//! Response shaping.
//!
//! Converts raw index hits into the stable [`SearchResponse`] the
//! web layer renders: typed fields, multi-value fields as lists and
//! scores scaled against the best hit.

use crate::core::error::{GnosisError, Result};
use crate::core::storage::{RawHit, RawResults, RawValue};
use crate::core::types::{SearchHit, SearchResponse};
use chrono::{DateTime, Utc};

/// Shape raw results into a response page
///
/// `preview_chars` truncates bodies when set. The `topic` and
/// `author` facets of `raw` become the response's facet lists.
pub fn shape_response(
    raw: RawResults,
    page_offset: usize,
    preview_chars: Option<usize>,
) -> Result<SearchResponse> {
    let max_score = raw.max_score;
    let mut facets = raw.facets;
    let topics = facets.remove("topic").unwrap_or_default();
    let authors = facets.remove("author").unwrap_or_default();

    let results = raw
        .hits
        .into_iter()
        .map(|hit| shape_hit(hit, max_score, preview_chars))
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResponse {
        total_hits: raw.total_hits,
        max_score,
        page_offset,
        search_time: raw.took,
        results,
        topics,
        authors,
    })
}

fn shape_hit(hit: RawHit, max_score: f32, preview_chars: Option<usize>) -> Result<SearchHit> {
    let score = if max_score > 0.0 {
        (f64::from(hit.score) / f64::from(max_score) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let body = scalar(&hit, "body")?;
    let body = match preview_chars {
        Some(limit) => body.map(|text| truncate_body(&text, limit)),
        None => body,
    };

    Ok(SearchHit {
        title: scalar(&hit, "title")?.unwrap_or_default(),
        uri_path: scalar(&hit, "path")?.unwrap_or_default(),
        score,
        topics: multi(&hit, "topic")?,
        keywords: multi(&hit, "keyword")?,
        authors: multi(&hit, "author")?,
        body,
        modified: date(&hit, "modified")?,
    })
}

fn scalar(hit: &RawHit, field: &str) -> Result<Option<String>> {
    match hit.fields.get(field) {
        None => Ok(None),
        Some(RawValue::Text(text)) => Ok(Some(text.clone())),
        Some(_) => Err(results_format(field)),
    }
}

/// Native repeated values, or one space-joined string split apart
fn multi(hit: &RawHit, field: &str) -> Result<Vec<String>> {
    match hit.fields.get(field) {
        None => Ok(Vec::new()),
        Some(RawValue::Text(joined)) => Ok(joined.split_whitespace().map(str::to_string).collect()),
        Some(RawValue::Texts(values)) => Ok(values.clone()),
        Some(_) => Err(results_format(field)),
    }
}

fn date(hit: &RawHit, field: &str) -> Result<Option<DateTime<Utc>>> {
    match hit.fields.get(field) {
        None => Ok(None),
        Some(RawValue::Date(date)) => Ok(Some(*date)),
        Some(_) => Err(results_format(field)),
    }
}

fn results_format(field: &str) -> GnosisError {
    GnosisError::ResultsFormat {
        field: field.to_string(),
    }
}

/// Cut `text` to at most `max_chars` characters at a word boundary
///
/// An ellipsis is appended only when something was cut. A first
/// word longer than the limit is cut mid-word.
pub fn truncate_body(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let head = &text[..cut];
    let boundary = if text[cut..].starts_with(char::is_whitespace) {
        cut
    } else {
        head.rfind(char::is_whitespace).unwrap_or(cut)
    };

    let mut preview = head[..boundary].trim_end().to_string();
    if preview.is_empty() {
        preview = head.to_string();
    }
    preview.push('…');
    preview
}
