pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod inventory;
pub mod rag;
pub mod search;
pub mod templates;
pub mod types;

// Re-export primary types for convenience
pub use chat::{ChatOrchestrator, ChatSession, MessageRole, TurnOutcome, TurnStatus};
pub use config::AppConfig;
pub use error::{ConfigError, SearchError};
pub use inventory::{Inventory, InventorySnapshot};
pub use rag::{finalize_for_display, reconcile};
pub use search::{DiscoveryEngineClient, DocumentListing, DocumentSearch, StaticSearch};
pub use templates::InstructionTemplate;
pub use types::{DocumentCount, SearchResponse, SearchResult};
