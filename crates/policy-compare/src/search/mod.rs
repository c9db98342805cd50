pub mod discovery;
pub mod memory;

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{DocumentCount, SearchResponse};

pub use discovery::DiscoveryEngineClient;
pub use memory::StaticSearch;

/// Capability boundary around the managed document store.
///
/// Implemented by the Discovery Engine REST client and by [`StaticSearch`]
/// for tests and offline runs.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Run one summarized search. Implementations must reject blank queries
    /// with [`SearchError::EmptyQuery`] and must not retry.
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;

    /// Distinct document filenames in the store, sorted.
    async fn list_documents(&self) -> Result<Vec<String>, SearchError>;

    /// Never fails; lookup problems yield [`DocumentCount::Unavailable`].
    async fn count_documents(&self) -> DocumentCount {
        match self.inventory().await {
            Ok(listing) => DocumentCount::Known(listing.count),
            Err(e) => {
                tracing::warn!(error = %e, "Document count unavailable");
                DocumentCount::Unavailable
            }
        }
    }

    /// Latest known store size, for backends that quote it in their
    /// instructions. Called by [`Inventory`](crate::Inventory) on every refetch.
    fn set_document_count(&self, _count: Option<usize>) {}

    /// Count and filenames from a single pass over the store.
    async fn inventory(&self) -> Result<DocumentListing, SearchError> {
        let files = self.list_documents().await?;
        Ok(DocumentListing {
            count: files.len(),
            files,
        })
    }
}

/// Result of one walk over the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListing {
    /// Stored documents, which may exceed `files.len()` when names repeat.
    pub count: usize,
    pub files: Vec<String>,
}

/// Reject empty or whitespace-only queries.
pub fn ensure_query(query: &str) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(SearchError::EmptyQuery)
    } else {
        Ok(trimmed)
    }
}

/// Deduplicate and sort document names for display.
pub fn normalize_listing(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    names.dedup();
    names
}
