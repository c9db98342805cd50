//! Line-oriented chat surface: command parsing and rendering.

use policy_compare::chat::ChatMessage;
use policy_compare::{InventorySnapshot, MessageRole, TurnStatus};

pub const DISCLAIMER: &str = "Note: this tool only lines up policy terms side by side. \
The insurer's latest published rules govern actual coverage.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the document count and list.
    Docs,
    /// Drop the inventory cache and refetch.
    Refresh,
    /// Clear the transcript.
    Reset,
    History,
    Help,
    Quit,
    Unknown(String),
    Query(String),
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if !line.starts_with('/') {
        return Command::Query(line.to_string());
    }
    match line.to_lowercase().as_str() {
        "/docs" | "/files" => Command::Docs,
        "/refresh" => Command::Refresh,
        "/reset" => Command::Reset,
        "/history" => Command::History,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

pub fn help_text() -> &'static str {
    "Type a comparison request, e.g. \"Compare the exclusions of WPD1 and 1X\".\n\
     Commands:\n  \
       /docs     show the documents in the data store\n  \
       /refresh  reload the document list\n  \
       /reset    clear the conversation\n  \
       /history  show the conversation so far\n  \
       /help     show this help\n  \
       /quit     exit"
}

pub fn render_banner(data_store_id: &str, snapshot: &InventorySnapshot) -> String {
    format!(
        "Insurance policy side-by-side comparison\n\
         Scope: data store {}\n\
         {} policy documents loaded. Type /help for commands.",
        data_store_id, snapshot.count
    )
}

pub fn render_inventory(snapshot: &InventorySnapshot) -> String {
    let mut out = format!("{} policy documents loaded\n", snapshot.count);
    for line in snapshot.display_lines() {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(
        "(as of {})",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

pub fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    format!("[{}] {}:\n{}", message.timestamp.format("%H:%M:%S"), speaker, message.content)
}

pub fn render_status(status: TurnStatus, document_count: &str) -> String {
    match status {
        TurnStatus::Pending => format!(
            "... searching {} policy documents for evidence",
            document_count
        ),
        TurnStatus::Success => "... analysis complete".to_string(),
        TurnStatus::Error => "... processing failed".to_string(),
    }
}
