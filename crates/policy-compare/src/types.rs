use serde::{Deserialize, Serialize};
use std::fmt;

/// One retrieved document reference returned alongside a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title as reported by the service. Often carries export noise
    /// such as "Microsoft Word - ".
    pub title: String,
    /// Storage URI of the document. The last path segment is the true filename.
    pub link: String,
    pub page_numbers: Option<Vec<String>>,
    pub document_id: Option<String>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            page_numbers: None,
            document_id: None,
        }
    }

    pub fn with_pages(mut self, pages: Vec<String>) -> Self {
        self.page_numbers = Some(pages);
        self
    }
}

/// Summary text plus the results it was synthesized from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub summary_text: String,
    pub results: Vec<SearchResult>,
}

/// Number of documents in the store, or a sentinel when the lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCount {
    Known(usize),
    Unavailable,
}

impl DocumentCount {
    pub fn known(&self) -> Option<usize> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unavailable => None,
        }
    }
}

impl fmt::Display for DocumentCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::Unavailable => f.write_str("N/A"),
        }
    }
}
