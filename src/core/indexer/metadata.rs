//! Page metadata extraction.
//!
//! Pulls the title and the `key: value` metadata lines out of a
//! markdown page before it is indexed. Everything above the title
//! is metadata, everything below it is body.
//!
//! ```text
//! topic: Operations Runbook
//! author = Jane Doe
//!
//! Restarting the cache
//! ====================
//! body ...
//! ```

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::core::error::{GnosisError, Result};

// key [:=] value, key matched case-insensitively
static META_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(tag|topic|category|keyword|meta|author|maintainer)\s*[:=]\s*(.*)$")
        .unwrap()
});

/// Title, metadata and body of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub topics: BTreeSet<String>,
    pub keywords: BTreeSet<String>,
    pub authors: BTreeSet<String>,

    /// Text after the title line(s), verbatim
    pub body: String,

    /// Last modification time of the file
    pub modified: DateTime<Utc>,

    /// File length in bytes
    pub len: u64,
}

impl PageMetadata {
    /// Read and parse a page from disk
    pub fn load(path: &Path) -> Result<Self> {
        let read_err = |source| GnosisError::PageRead {
            path: path.to_path_buf(),
            source,
        };

        let stat = fs::metadata(path).map_err(read_err)?;
        let text = fs::read_to_string(path).map_err(read_err)?;

        let mut page = Self::parse(&text).ok_or_else(|| GnosisError::NoTitle {
            path: path.to_path_buf(),
        })?;
        page.len = stat.len();
        if let Ok(modified) = stat.modified() {
            page.modified = DateTime::<Utc>::from(modified);
        }

        Ok(page)
    }

    /// Parse page text
    ///
    /// Returns `None` when no title appears before the end of the
    /// text. `modified` and `len` are left at their defaults.
    pub fn parse(text: &str) -> Option<Self> {
        let mut page = Self {
            title: String::new(),
            topics: BTreeSet::new(),
            keywords: BTreeSet::new(),
            authors: BTreeSet::new(),
            body: String::new(),
            modified: DateTime::<Utc>::default(),
            len: text.len() as u64,
        };

        let lines: Vec<&str> = text.split_inclusive('\n').collect();

        for (i, raw) in lines.iter().enumerate() {
            let line = raw.trim_end_matches(['\n', '\r']);

            if let Some(title) = atx_title(line) {
                page.title = title.to_string();
                page.body = lines[i + 1..].concat();
                return Some(page);
            }

            if !line.trim().is_empty() {
                if let Some(next) = lines.get(i + 1) {
                    if is_setext_underline(next) {
                        page.title = line.trim().to_string();
                        page.body = lines[i + 2..].concat();
                        return Some(page);
                    }
                }
            }

            page.process_metadata(line);
        }

        None
    }

    fn process_metadata(&mut self, line: &str) {
        let Some(caps) = META_LINE.captures(line) else {
            return;
        };

        let value = slugify(&caps[2]);
        if value.is_empty() {
            return;
        }

        match caps[1].to_ascii_lowercase().as_str() {
            "tag" | "topic" | "category" => self.topics.insert(value),
            "keyword" | "meta" => self.keywords.insert(value),
            _ => self.authors.insert(value),
        };
    }

    /// True if any restricted topic is present on the page
    pub fn matched_topic(&self, restricted: &[String]) -> bool {
        restricted.iter().any(|topic| self.topics.contains(topic))
    }

    /// Topics, keywords and authors as sorted lists
    pub fn list_meta(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            self.topics.iter().cloned().collect(),
            self.keywords.iter().cloned().collect(),
            self.authors.iter().cloned().collect(),
        )
    }
}

/// Normalize a metadata value into a slug
///
/// Whitespace runs become single dashes, repeated dashes collapse
/// and the result is lower-cased. Applying it twice gives the same
/// result as applying it once.
pub fn slugify(value: &str) -> String {
    let joined = value
        .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '=')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    let mut slug = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.extend(c.to_lowercase());
    }
    slug
}

/// `# Title` or `#Title`, trailing hashes stripped
fn atx_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    if rest.starts_with('#') {
        return None;
    }

    let title = rest.trim().trim_end_matches('#').trim();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn is_setext_underline(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '=')
}
