//! In-memory backend returning canned responses.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ensure_query, normalize_listing, DocumentSearch};
use crate::error::SearchError;
use crate::types::SearchResponse;

/// Serves a fixed response for every query and records what it was asked.
pub struct StaticSearch {
    response: Mutex<Result<SearchResponse, String>>,
    documents: Mutex<Result<Vec<String>, String>>,
    queries: Mutex<Vec<String>>,
    listings: Mutex<usize>,
    document_count: Mutex<Option<usize>>,
}

impl StaticSearch {
    pub fn new(response: SearchResponse, documents: Vec<String>) -> Self {
        Self {
            response: Mutex::new(Ok(response)),
            documents: Mutex::new(Ok(documents)),
            queries: Mutex::new(Vec::new()),
            listings: Mutex::new(0),
            document_count: Mutex::new(None),
        }
    }

    /// Make subsequent searches fail with a transport error.
    pub fn fail_search(&self, message: impl Into<String>) {
        *self.response.lock() = Err(message.into());
    }

    /// Make subsequent listings fail with a transport error.
    pub fn fail_listing(&self, message: impl Into<String>) {
        *self.documents.lock() = Err(message.into());
    }

    pub fn set_response(&self, response: SearchResponse) {
        *self.response.lock() = Ok(response);
    }

    pub fn set_documents(&self, documents: Vec<String>) {
        *self.documents.lock() = Ok(documents);
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    /// Number of times the document list was requested.
    pub fn listing_calls(&self) -> usize {
        *self.listings.lock()
    }

    /// Count last pushed through [`DocumentSearch::set_document_count`].
    pub fn document_count(&self) -> Option<usize> {
        *self.document_count.lock()
    }
}

impl Default for StaticSearch {
    fn default() -> Self {
        Self::new(SearchResponse::default(), Vec::new())
    }
}

#[async_trait]
impl DocumentSearch for StaticSearch {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let query = ensure_query(query)?;
        self.queries.lock().push(query.to_string());
        self.response
            .lock()
            .clone()
            .map_err(SearchError::Transport)
    }

    fn set_document_count(&self, count: Option<usize>) {
        *self.document_count.lock() = count;
    }

    async fn list_documents(&self) -> Result<Vec<String>, SearchError> {
        *self.listings.lock() += 1;
        let documents = self.documents.lock().clone().map_err(SearchError::Transport)?;
        Ok(normalize_listing(documents))
    }
}
