//! Cached document inventory for the sidebar.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::search::DocumentSearch;
use crate::types::DocumentCount;

/// Point-in-time view of the document store.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub count: DocumentCount,
    /// Sorted unique filenames, or the error message when listing failed.
    pub files: Result<Vec<String>, String>,
    pub fetched_at: DateTime<Utc>,
}

impl InventorySnapshot {
    /// Lines to show under the document count.
    pub fn display_lines(&self) -> Vec<String> {
        match &self.files {
            Ok(files) if files.is_empty() => {
                vec!["No documents are currently in the data store".to_string()]
            }
            Ok(files) => files.clone(),
            Err(e) => vec![format!("Unable to read the document list: {}", e)],
        }
    }
}

pub struct Inventory<S: DocumentSearch> {
    backend: Arc<S>,
    ttl: Duration,
    cached: RwLock<Option<InventorySnapshot>>,
}

impl<S: DocumentSearch> Inventory<S> {
    /// `ttl` usually comes from [`AppConfig::inventory_ttl`](crate::AppConfig::inventory_ttl).
    pub fn new(backend: Arc<S>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Cached snapshot, refetched when missing or older than the TTL.
    pub async fn snapshot(&self) -> InventorySnapshot {
        if let Some(snapshot) = self.cached.read().as_ref() {
            if Utc::now() - snapshot.fetched_at < self.ttl {
                return snapshot.clone();
            }
        }

        let snapshot = self.fetch().await;
        *self.cached.write() = Some(snapshot.clone());
        snapshot
    }

    /// Drop the cached snapshot so the next read refetches.
    pub fn invalidate(&self) {
        tracing::info!("Inventory cache invalidated");
        *self.cached.write() = None;
    }

    async fn fetch(&self) -> InventorySnapshot {
        let (count, files) = match self.backend.inventory().await {
            Ok(listing) => (DocumentCount::Known(listing.count), Ok(listing.files)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list documents");
                (DocumentCount::Unavailable, Err(e.to_string()))
            }
        };
        self.backend.set_document_count(count.known());

        tracing::info!(
            count = %count,
            listed = files.as_ref().map(|f| f.len()).unwrap_or(0),
            "Fetched document inventory"
        );

        InventorySnapshot {
            count,
            files,
            fetched_at: Utc::now(),
        }
    }
}
