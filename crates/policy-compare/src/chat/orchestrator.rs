//! One search-and-reconcile cycle per user turn.

use std::sync::Arc;

use super::{ChatSession, MessageRole};
use crate::rag::{finalize_for_display, reconcile};
use crate::search::DocumentSearch;

/// Shown to the user when a turn fails; the error text is appended.
pub const TEMPORARY_FAILURE_MESSAGE: &str =
    "The system is temporarily unable to process your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Pending,
    Success,
    Error,
}

/// Receives status transitions while a turn runs.
pub trait TurnObserver {
    fn on_status(&mut self, status: TurnStatus);
}

impl<F: FnMut(TurnStatus)> TurnObserver for F {
    fn on_status(&mut self, status: TurnStatus) {
        self(status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Cleaned answer, also appended to the transcript.
    Answered(String),
    /// User-facing failure message. Not appended to the transcript.
    Failed(String),
}

pub struct ChatOrchestrator<S: DocumentSearch> {
    backend: Arc<S>,
}

impl<S: DocumentSearch> ChatOrchestrator<S> {
    pub fn new(backend: Arc<S>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<S> {
        &self.backend
    }

    /// Record the query, run one search, reconcile and clean the summary,
    /// then record the answer. Failures are reported, never retried.
    pub async fn process_turn(
        &self,
        session: &mut ChatSession,
        query: &str,
        observer: &mut dyn TurnObserver,
    ) -> TurnOutcome {
        session.push(MessageRole::User, query);
        observer.on_status(TurnStatus::Pending);

        match self.backend.search(query).await {
            Ok(response) => {
                let reconciled = reconcile(&response.summary_text, &response.results);
                let answer = finalize_for_display(&reconciled);

                tracing::info!(
                    results = response.results.len(),
                    answer_len = answer.len(),
                    "Turn answered"
                );

                session.push(MessageRole::Assistant, answer.clone());
                observer.on_status(TurnStatus::Success);
                TurnOutcome::Answered(answer)
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                observer.on_status(TurnStatus::Error);
                TurnOutcome::Failed(format!("{} Error: {}", TEMPORARY_FAILURE_MESSAGE, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::StaticSearch;
    use crate::types::{SearchResponse, SearchResult};
    use pretty_assertions::assert_eq;

    fn backend() -> Arc<StaticSearch> {
        Arc::new(StaticSearch::new(
            SearchResponse {
                summary_text: "| Item | Microsoft Word - HO6 |  |\n* 【HO6】 [ :2]".into(),
                results: vec![SearchResult::new("Microsoft Word - HO6", "gs://b/HO5")],
            },
            vec![],
        ))
    }

    #[tokio::test]
    async fn test_successful_turn_appends_both_messages() {
        let orchestrator = ChatOrchestrator::new(backend());
        let mut session = ChatSession::new();
        let mut statuses = Vec::new();

        let outcome = orchestrator
            .process_turn(&mut session, "compare HO6", &mut |s: TurnStatus| statuses.push(s))
            .await;

        let expected = "| Item | HO5 | No relevant data found |\n* 【HO5】 [:2]";
        assert_eq!(outcome, TurnOutcome::Answered(expected.to_string()));
        assert_eq!(statuses, vec![TurnStatus::Pending, TurnStatus::Success]);
        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[0].content, "compare HO6");
        assert_eq!(session.messages()[1].role, MessageRole::Assistant);
        assert_eq!(session.messages()[1].content, expected);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_only_user_message() {
        let backend = backend();
        backend.fail_search("quota exhausted");
        let orchestrator = ChatOrchestrator::new(backend.clone());
        let mut session = ChatSession::new();
        let mut statuses = Vec::new();

        let outcome = orchestrator
            .process_turn(&mut session, "compare HO6", &mut |s: TurnStatus| statuses.push(s))
            .await;

        match outcome {
            TurnOutcome::Failed(message) => {
                assert!(message.starts_with(TEMPORARY_FAILURE_MESSAGE));
                assert!(message.contains("quota exhausted"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(statuses, vec![TurnStatus::Pending, TurnStatus::Error]);
        assert_eq!(session.len(), 1);
        // No automatic retry.
        assert_eq!(backend.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_is_reported() {
        let orchestrator = ChatOrchestrator::new(backend());
        let mut session = ChatSession::new();

        let outcome = orchestrator
            .process_turn(&mut session, "   ", &mut |_: TurnStatus| {})
            .await;

        assert!(matches!(outcome, TurnOutcome::Failed(m) if m.contains("query must not be empty")));
    }
}
