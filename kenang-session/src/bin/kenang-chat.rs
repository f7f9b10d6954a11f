//! Terminal host for a kenang session.
//!
//! Reads one message per line from stdin and prints the conversation to
//! stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use kenang_core::config::KenangConfig;
use kenang_core::emotion::Expression;
use kenang_core::types::Role;
use kenang_session::{LoadOutcome, RenderSink, Session, SessionStatus};

#[derive(Parser)]
#[command(name = "kenang-chat")]
#[command(about = "Chat with a companion that remembers you")]
#[command(version)]
struct Cli {
    /// Path to kenang.toml (defaults are used when omitted)
    #[arg(short, long, env = "KENANG_CONFIG")]
    config: Option<PathBuf>,

    /// Print the prompt sent for each turn to stderr
    #[arg(long)]
    show_prompt: bool,
}

/// Prints turns as `Name: text` lines.
struct TerminalSink {
    persona: String,
}

impl RenderSink for TerminalSink {
    fn render(&self, role: Role, text: &str) {
        match role {
            // The user's own line is already on screen.
            Role::User => {}
            Role::Assistant => println!("{}: {}", self.persona, text.trim()),
        }
    }

    fn status(&self, status: SessionStatus) {
        if status != SessionStatus::Sending {
            println!("[{status}]");
        }
    }

    fn expression(&self, expression: Expression) {
        tracing::trace!(?expression, "Expression changed");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => KenangConfig::from_file(path)?,
        None => KenangConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let sink = Arc::new(TerminalSink {
        persona: config.persona.name.clone(),
    });
    let mut session = Session::from_config(config, sink)?;

    if session.load_memory().await == LoadOutcome::Loaded {
        let memory = session.memory();
        tracing::info!(
            facts = memory.facts.len(),
            preferences = memory.preferences.len(),
            "Welcome back"
        );
    }

    println!(
        "{} siap menemani. Ketik /memori untuk melihat memori, /keluar untuk berhenti.",
        session.config().persona.name
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/keluar" | "/exit" => break,
            "/memori" => {
                println!("{}", serde_json::to_string_pretty(&session.memory().to_blob())?);
            }
            _ => {
                if let Some(report) = session.submit(&line).await {
                    if cli.show_prompt {
                        eprintln!("--- prompt ---\n{}\n--------------", report.prompt);
                    }
                }
            }
        }
    }

    if !session.save().await {
        eprintln!("{}", SessionStatus::MemorySaveFailed);
    }
    Ok(())
}
