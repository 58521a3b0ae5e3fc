//! Pipeline observer events.
//!
//! Renderers subscribe to a broadcast channel and project the stream onto
//! their own view. Emission never blocks and never fails: with no subscriber
//! the event is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{LogEntry, RunStatus, StageStatus, Verdict};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageChanged { index: usize, status: StageStatus },
    LogAppended { entry: LogEntry },
    /// The log buffer was rewritten wholesale (clear, reconciliation, reset)
    LogReplaced { len: usize },
    VerdictChanged { verdict: Verdict },
    RunStatusChanged { status: RunStatus },
    /// One-shot celebration signal at the end of a clean simulated run
    CompletionEffect,
}

#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<PipelineEvent>,
}

impl Default for EventSink {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl EventSink {
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}
