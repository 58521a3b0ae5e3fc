//! PromptGuard Pipeline
//!
//! Staged pipeline visualization and log-stream engine. Everything here is
//! session-scoped state plus the engines that mutate it:
//!
//! - `models` - Stage, log, verdict and transcript data types
//! - `board` - StageBoard, BoardSnapshot and the elapsed-time counter
//! - `log_stream` - Bounded, pausable, FIFO-evicting LogStream
//! - `transcript` - SessionTranscript
//! - `events` - PipelineEvent broadcast for renderers
//! - `state` - PipelineState, the single source of truth for one conversation
//! - `simulation` - SimulationDriver (optimistic timed progression)
//! - `reconcile` - ReconciliationEngine (authoritative overwrite)
//! - `risk` - RiskSummaryEngine (heuristic read-only summary)
//!
//! HTTP, config files and the submission control flow live in the main crate.

pub mod board;
pub mod events;
pub mod log_stream;
pub mod models;
pub mod reconcile;
pub mod risk;
pub mod simulation;
pub mod state;
pub mod transcript;

// Re-export model types
pub use models::{
    ConversationMessage, LogEntry, LogLevel, Provenance, RunStatus, Sender, Stage, StageStatus,
    Verdict,
};

// Re-export state containers
pub use board::{BoardSnapshot, ElapsedTimer, StageBoard};
pub use log_stream::{LogStream, CLEARED_MESSAGE, DEFAULT_LOG_CAPACITY};
pub use state::{PipelineSnapshot, PipelineState, SharedPipeline};
pub use transcript::SessionTranscript;

// Re-export engines
pub use events::{EventSink, PipelineEvent};
pub use reconcile::{ReconciliationEngine, ReconciliationOutcome};
pub use risk::{RiskSummary, RiskSummaryEngine};
pub use simulation::{
    FlavorLine, FlavorScript, SimulationCanceller, SimulationConfig, SimulationDriver,
    SimulationExit, SimulationHandle, RUN_COMPLETE_MESSAGE, RUN_STARTED_MESSAGE,
};
