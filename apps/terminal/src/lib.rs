pub mod app;
pub mod cli;
pub mod command;
pub mod db;
pub mod terminal;
pub mod ticker;

use std::io::BufRead;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Cli;
use crate::db::SqliteStore;
use crate::terminal::TerminalFrontend;
use matemagica_core::Session;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let db_path = cli.db_path();

    tracing::info!(path = %db_path.display(), "Opening database...");
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let mut session = Session::open(store);
    session.set_voice_narration(cli.voice);
    session.set_sign_language_mode(cli.libras);

    let mut ui = TerminalFrontend::new(std::io::stdout(), spawn_stdin_reader());
    ui.set_sign_language(cli.libras);

    let mut app = App::new(session, ui, cli.mode.into());
    app.greet();
    app.run().await;
    Ok(())
}

/// Forward stdin lines from a dedicated thread.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}
