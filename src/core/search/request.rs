//! Search request types.

/// What to match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    /// Query-string syntax over title and body
    QueryString(String),

    /// Fuzzy term, optionally narrowed to topics and authors
    Fuzzy {
        term: String,
        topics: Vec<String>,
        authors: Vec<String>,
    },

    /// Every page
    MatchAll,

    /// Pages whose `field` matches `value`
    FieldValue { field: String, value: String },
}

/// A paginated search over one index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub spec: QuerySpec,

    /// Stored fields to return per hit
    pub fields: Vec<String>,

    /// Zero-based page number
    pub page: usize,

    pub page_size: usize,

    /// Fields whose distinct values ride along with the hits
    pub facets: Vec<String>,
}

impl SearchRequest {
    pub fn new(spec: QuerySpec, fields: &[&str], page: usize, page_size: usize) -> Self {
        Self {
            spec,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            page,
            page_size,
            facets: Vec::new(),
        }
    }

    /// Also collect the distinct values of `facets`
    pub fn with_facets(mut self, facets: &[&str]) -> Self {
        self.facets = facets.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Number of hits skipped before this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }
}
