//! Pipeline Models
//!
//! Data types shared by the stage board, log stream, transcript and the
//! engines that drive them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visualization status of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started (or not evaluated by the backend)
    #[default]
    Idle,
    /// Currently being visualized as running
    Processing,
    /// Completed / passed
    Done,
    /// Failed / blocked
    Error,
}

impl StageStatus {
    /// Whether the stage has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Done | StageStatus::Error)
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Idle => write!(f, "idle"),
            StageStatus::Processing => write!(f, "processing"),
            StageStatus::Done => write!(f, "done"),
            StageStatus::Error => write!(f, "error"),
        }
    }
}

/// One stage of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// 1-based stage index
    pub index: usize,
    pub status: StageStatus,
}

/// Overall status of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Processing,
    Complete,
    Blocked,
    /// The backend could not be reached; the board shows whatever the
    /// simulation had reached.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Processing => write!(f, "processing"),
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Blocked => write!(f, "blocked"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Where a log entry or verdict came from.
///
/// `Simulated` content is visualization flavor produced while the request is
/// in flight. Nothing authoritative may be derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Simulated,
    Authoritative,
}

/// Log entry severity / category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Process,
    Success,
    Warning,
    Danger,
    Error,
    System,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Process => "PROCESS",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Danger => "DANGER",
            LogLevel::Error => "ERROR",
            LogLevel::System => "SYSTEM",
        };
        f.write_str(label)
    }
}

/// An immutable log stream entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub provenance: Provenance,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            provenance,
        }
    }

    pub fn simulated(level: LogLevel, message: impl Into<String>) -> Self {
        Self::new(level, message, Provenance::Simulated)
    }

    pub fn authoritative(level: LogLevel, message: impl Into<String>) -> Self {
        Self::new(level, message, Provenance::Authoritative)
    }
}

/// Terminal classification of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Awaiting analysis
    #[default]
    Idle,
    /// All stages passed
    Safe { provenance: Provenance },
    /// Blocked, at a specific stage when the backend reported one
    Blocked {
        at_stage: Option<usize>,
        reason: String,
        provenance: Provenance,
    },
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked { .. })
    }

    pub fn provenance(&self) -> Option<Provenance> {
        match self {
            Verdict::Idle => None,
            Verdict::Safe { provenance } | Verdict::Blocked { provenance, .. } => Some(*provenance),
        }
    }

    /// Human-readable headline, e.g. "Blocked at stage 2".
    pub fn label(&self) -> String {
        match self {
            Verdict::Idle => "Awaiting analysis".to_string(),
            Verdict::Safe { .. } => "Safe".to_string(),
            Verdict::Blocked {
                at_stage: Some(stage),
                ..
            } => format!("Blocked at stage {}", stage),
            Verdict::Blocked { at_stage: None, .. } => "Blocked".to_string(),
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Model,
    System,
}

/// One conversation message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// Attached image payload (e.g. a data URL), carried opaquely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(sender: Sender, text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            image,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::Idle.label(), "Awaiting analysis");
        assert_eq!(
            Verdict::Safe {
                provenance: Provenance::Simulated
            }
            .label(),
            "Safe"
        );
        let blocked = Verdict::Blocked {
            at_stage: Some(2),
            reason: "high entropy".to_string(),
            provenance: Provenance::Authoritative,
        };
        assert_eq!(blocked.to_string(), "Blocked at stage 2");
        assert!(blocked.is_blocked());
        assert_eq!(blocked.provenance(), Some(Provenance::Authoritative));
    }

    #[test]
    fn test_log_level_serializes_uppercase() {
        let json = serde_json::to_string(&LogLevel::Danger).unwrap();
        assert_eq!(json, "\"DANGER\"");
        assert_eq!(LogLevel::Process.to_string(), "PROCESS");
    }

    #[test]
    fn test_stage_status_terminal() {
        assert!(StageStatus::Done.is_terminal());
        assert!(StageStatus::Error.is_terminal());
        assert!(!StageStatus::Processing.is_terminal());
        assert!(!StageStatus::Idle.is_terminal());
    }

    #[test]
    fn test_messages_get_unique_ids() {
        let a = ConversationMessage::new(Sender::User, "hi", None);
        let b = ConversationMessage::new(Sender::User, "hi", None);
        assert_ne!(a.id, b.id);
    }
}
