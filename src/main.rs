// PromptGuard Desktop - terminal entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use promptguard_desktop::commands;
use promptguard_desktop::console::{self, ConsoleCommand};
use promptguard_desktop::models::response::CommandResponse;
use promptguard_desktop::services::session::SubmitOutcome;
use promptguard_desktop::storage::ConfigService;
use promptguard_desktop::{AppState, SettingsUpdate};

#[derive(Parser)]
#[command(name = "promptguard-desktop")]
#[command(about = "Moderation pipeline dashboard for the PromptGuard backend")]
struct Cli {
    /// Path to configuration file (default: ~/.promptguard/config.json)
    #[arg(short, long, env = "PROMPTGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Moderation backend base URL (overrides config file)
    #[arg(long, env = "PROMPTGUARD_BACKEND_URL")]
    backend_url: Option<String>,

    /// User id sent with submissions (overrides config file)
    #[arg(long, env = "PROMPTGUARD_USER_ID")]
    user_id: Option<String>,

    /// Number of pipeline stages on the board (overrides config file)
    #[arg(long)]
    stages: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the board on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PROMPTGUARD_LOG")
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => ConfigService::load_or_create(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;

    config
        .apply_overrides(SettingsUpdate {
            backend_url: cli.backend_url,
            user_id: cli.user_id,
            stage_count: cli.stages,
            ..Default::default()
        })
        .context("invalid command-line override")?;
    info!(
        config = %config.path().display(),
        backend = %config.get_config().backend_url,
        "starting promptguard-desktop"
    );

    let state = Arc::new(AppState::new());
    state
        .initialize(config)
        .await
        .context("failed to initialize application state")?;

    spawn_event_renderer(&state).await?;

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = ConsoleCommand::parse(&line) else {
            continue;
        };
        if command == ConsoleCommand::Quit {
            break;
        }
        run_command(&state, command).await;
    }

    Ok(())
}

/// Print live pipeline events as they happen.
async fn spawn_event_renderer(state: &AppState) -> anyhow::Result<()> {
    let session = state.session().await?;
    let mut events = session.pipeline().read().await.events().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = console::render_event(&event) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    println!("... {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    Ok(())
}

/// Submissions run in their own task so the board, log and `/new`
/// commands stay usable while the backend is answering.
fn spawn_submission(state: Arc<AppState>, text: String) {
    tokio::spawn(async move {
        let response = commands::submit_message(&state, text, None).await;
        if let Some(outcome) = report(response) {
            print_outcome(outcome);
            print_board(&state).await;
        }
    });
}

fn print_outcome(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Replied {
            reply, severity, ..
        } => {
            println!("{}", console::render_message(&reply));
            print_severity(severity);
        }
        SubmitOutcome::Blocked {
            reason, severity, ..
        } => {
            println!("System: {}", reason);
            print_severity(severity);
        }
        SubmitOutcome::Failed { error } => println!("System: request failed ({})", error),
        SubmitOutcome::Discarded => {}
    }
}

fn print_severity(severity: Option<String>) {
    if let Some(severity) = severity {
        println!("Severity: {}", severity);
    }
}

async fn run_command(state: &Arc<AppState>, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Help => println!("{}", console::HELP),
        ConsoleCommand::Submit(text) => spawn_submission(state.clone(), text),
        ConsoleCommand::New => {
            if let Some(snapshot) = report(commands::new_conversation(state).await) {
                println!("{}", console::render_board(&snapshot));
            }
        }
        ConsoleCommand::Board => print_board(state).await,
        ConsoleCommand::Logs => {
            if let Some(entries) = report(commands::get_logs(state).await) {
                for entry in &entries {
                    println!("{}", console::render_log(entry));
                }
            }
        }
        ConsoleCommand::Pause => {
            if let Some(paused) = report(commands::toggle_log_pause(state).await) {
                println!("Log stream {}", if paused { "paused" } else { "resumed" });
            }
        }
        ConsoleCommand::Clear => {
            if let Some(marker) = report(commands::clear_logs(state).await) {
                println!("{}", console::render_log(&marker));
            }
        }
        ConsoleCommand::Risk => {
            if let Some(summary) = report(commands::get_risk_summary(state).await) {
                println!("{}", console::render_risk(&summary));
            }
        }
        ConsoleCommand::Transcript => {
            if let Some(messages) = report(commands::get_transcript(state).await) {
                for message in &messages {
                    println!("{}", console::render_message(message));
                }
            }
        }
        ConsoleCommand::Export => {
            if let Some(path) = report(commands::export_logs(state).await) {
                println!("Logs exported to {}", path);
            }
        }
        ConsoleCommand::History => print_json(commands::list_recent_conversations(state).await),
        ConsoleCommand::User(user_id) => {
            print_json(commands::get_user_status(state, user_id).await)
        }
        ConsoleCommand::Status => print_json(commands::get_server_status(state).await),
        ConsoleCommand::Settings => print_json(commands::get_settings(state).await),
        ConsoleCommand::Health => print_json(commands::get_health(state).await),
        ConsoleCommand::Unknown(input) => println!("Unknown command: {} (try /help)", input),
        ConsoleCommand::Quit => {}
    }
}

async fn print_board(state: &AppState) {
    if let Some(snapshot) = report(commands::get_board(state).await) {
        println!("{}", console::render_board(&snapshot));
    }
}

/// Unwrap a command response, printing its error if any.
fn report<T>(response: Result<CommandResponse<T>, String>) -> Option<T> {
    match response {
        Ok(CommandResponse {
            success: true,
            data,
            ..
        }) => data,
        Ok(CommandResponse { error, .. }) => {
            println!("Error: {}", error.unwrap_or_else(|| "unknown error".to_string()));
            None
        }
        Err(e) => {
            println!("Error: {}", e);
            None
        }
    }
}

fn print_json<T: Serialize>(response: Result<CommandResponse<T>, String>) {
    if let Some(data) = report(response) {
        match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("Error: {}", e),
        }
    }
}
