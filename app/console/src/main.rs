mod console;

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use console::{parse_command, Command};
use policy_compare::{
    AppConfig, ChatOrchestrator, ChatSession, DiscoveryEngineClient, InstructionTemplate,
    Inventory, TurnOutcome, TurnStatus,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::info!(
        project = %config.project_id,
        location = %config.location,
        data_store = %config.data_store_id,
        "Configuration loaded"
    );
    let template = match &config.instruction_template_file {
        Some(path) => InstructionTemplate::from_file(path)
            .with_context(|| format!("Failed to load instruction template {}", path.display()))?,
        None => InstructionTemplate::default(),
    };

    let client = Arc::new(
        DiscoveryEngineClient::new(config.clone(), template)
            .context("Failed to create search client")?,
    );
    let inventory = Inventory::new(client.clone(), config.inventory_ttl()?);
    let orchestrator = ChatOrchestrator::new(client.clone());
    let mut session = ChatSession::new();

    let snapshot = inventory.snapshot().await;
    println!("{}\n", console::render_banner(&config.data_store_id, &snapshot));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_command(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => println!("{}", console::help_text()),
            Command::Unknown(cmd) => {
                println!("Unknown command {}.\n{}", cmd, console::help_text())
            }
            Command::Docs => {
                let snapshot = inventory.snapshot().await;
                println!("{}", console::render_inventory(&snapshot));
            }
            Command::Refresh => {
                inventory.invalidate();
                let snapshot = inventory.snapshot().await;
                println!("{}", console::render_inventory(&snapshot));
            }
            Command::Reset => {
                session.reset();
                println!("Conversation cleared.");
            }
            Command::History => {
                if session.is_empty() {
                    println!("(no messages yet)");
                }
                for message in session.messages() {
                    println!("{}\n", console::render_message(message));
                }
            }
            Command::Query(query) => {
                let count = inventory.snapshot().await.count.to_string();
                let mut print_status =
                    |status: TurnStatus| println!("{}", console::render_status(status, &count));

                match orchestrator
                    .process_turn(&mut session, &query, &mut print_status)
                    .await
                {
                    TurnOutcome::Answered(answer) => println!("\n{}\n", answer),
                    TurnOutcome::Failed(message) => eprintln!("\n{}\n", message),
                }
            }
        }
    }

    tracing::info!(turns = session.len(), "Session ended");
    println!("\n{}", console::DISCLAIMER);
    Ok(())
}
