//! Terminal Front End
//!
//! Slash-command parsing and plain-text projections of the pipeline for the
//! interactive binary. Rendering is pure: every function takes a snapshot and
//! returns text.

use promptguard_pipeline::{
    ConversationMessage, LogEntry, PipelineEvent, PipelineSnapshot, RiskSummary, Sender,
    StageStatus,
};

pub const HELP: &str = "\
Type a message to submit it for moderation, or one of:
  /new              start a new conversation
  /board            show the stage board
  /logs             show the log stream
  /pause            mute or unmute the log stream
  /clear            clear the log stream
  /risk             show the risk summary
  /transcript       show the conversation
  /export           write a log export file
  /history          recent conversations from the backend
  /user [id]        user risk status
  /status           backend server status
  /settings         show settings
  /health           application health
  /quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    New,
    Board,
    Logs,
    Pause,
    Clear,
    Risk,
    Transcript,
    Export,
    History,
    User(Option<String>),
    Status,
    Settings,
    Health,
    Quit,
    Submit(String),
    Unknown(String),
}

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Submit(line.to_string()));
        };
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let command = match name.as_str() {
            "help" | "?" => Self::Help,
            "new" => Self::New,
            "board" => Self::Board,
            "logs" => Self::Logs,
            "pause" => Self::Pause,
            "clear" => Self::Clear,
            "risk" => Self::Risk,
            "transcript" => Self::Transcript,
            "export" => Self::Export,
            "history" => Self::History,
            "user" => Self::User(parts.next().map(str::to_string)),
            "status" => Self::Status,
            "settings" => Self::Settings,
            "health" => Self::Health,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(command)
    }
}

fn stage_glyph(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Idle => "·",
        StageStatus::Processing => "…",
        StageStatus::Done => "✓",
        StageStatus::Error => "✗",
    }
}

/// One-line board: `[1 ✓] [2 ✗] [3 ✓]  Blocked at stage 2  (01.52s)`
pub fn render_board(snapshot: &PipelineSnapshot) -> String {
    let stages = snapshot
        .stages
        .stages
        .iter()
        .map(|s| format!("[{} {}]", s.index, stage_glyph(s.status)))
        .collect::<Vec<_>>()
        .join(" ");
    let mut line = format!(
        "{}  {}  ({:05.2}s)",
        stages,
        snapshot.verdict.label(),
        snapshot.elapsed_ms as f64 / 1000.0
    );
    if snapshot.logs_paused {
        line.push_str("  [logs paused]");
    }
    line
}

pub fn render_log(entry: &LogEntry) -> String {
    format!(
        "[{}] [{}] {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level,
        entry.message
    )
}

pub fn render_message(message: &ConversationMessage) -> String {
    let who = match message.sender {
        Sender::User => "You",
        Sender::Model => "PromptGuard",
        Sender::System => "System",
    };
    let mut line = format!("{}: {}", who, message.text);
    if message.image.is_some() {
        line.push_str(" [image]");
    }
    line
}

pub fn render_risk(summary: &RiskSummary) -> String {
    let tags = summary
        .behavior_tags
        .iter()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let mut out = format!(
        "Risk: {}%\nBehavior: {}\nLikely intent: {}\n",
        summary.risk_percent, tags, summary.likely_intent
    );
    for recommendation in &summary.recommendations {
        out.push_str(&format!("  - {}\n", recommendation));
    }
    out.push_str(&summary.summary);
    out
}

/// Live projection of pipeline events. Stage changes are shown via the
/// board, not individually.
pub fn render_event(event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::LogAppended { entry } => Some(render_log(entry)),
        PipelineEvent::VerdictChanged { verdict } if verdict.provenance().is_some() => {
            Some(format!(">> {}", verdict))
        }
        PipelineEvent::CompletionEffect => Some("** all layers passed **".to_string()),
        _ => None,
    }
}
