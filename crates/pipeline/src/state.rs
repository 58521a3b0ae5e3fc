//! Session-scoped pipeline state.
//!
//! `PipelineState` owns the board, log stream, transcript and verdict for one
//! conversation. Writers hold the lock for a single short mutation and never
//! across an await; each write is checked against the run epoch so that a
//! superseded simulation step cannot land after a reset or reconciliation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::board::{BoardSnapshot, ElapsedTimer, StageBoard};
use crate::events::{EventSink, PipelineEvent};
use crate::log_stream::LogStream;
use crate::models::{
    ConversationMessage, LogEntry, LogLevel, Provenance, RunStatus, Sender, StageStatus, Verdict,
};
use crate::risk::{RiskSummary, RiskSummaryEngine};
use crate::transcript::SessionTranscript;

/// Shared handle to the pipeline state.
pub type SharedPipeline = Arc<RwLock<PipelineState>>;

/// Render-ready copy of the board and its run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub session_id: u64,
    pub stages: BoardSnapshot,
    pub status: RunStatus,
    pub verdict: Verdict,
    pub elapsed_ms: u64,
    pub logs_paused: bool,
}

#[derive(Debug)]
pub struct PipelineState {
    pub(crate) board: StageBoard,
    pub(crate) logs: LogStream,
    pub(crate) transcript: SessionTranscript,
    pub(crate) verdict: Verdict,
    pub(crate) status: RunStatus,
    pub(crate) elapsed: ElapsedTimer,
    stage_count: usize,
    epoch: u64,
    session_id: u64,
    events: EventSink,
}

impl PipelineState {
    pub fn new(stage_count: usize, log_capacity: usize) -> Self {
        Self {
            board: StageBoard::new(stage_count),
            logs: LogStream::new(log_capacity),
            transcript: SessionTranscript::new(),
            verdict: Verdict::Idle,
            status: RunStatus::Idle,
            elapsed: ElapsedTimer::default(),
            stage_count,
            epoch: 0,
            session_id: 0,
            events: EventSink::default(),
        }
    }

    pub fn shared(self) -> SharedPipeline {
        Arc::new(RwLock::new(self))
    }

    // ========================================================================
    // Epoch / session bookkeeping
    // ========================================================================

    /// Start a new run and return its epoch.
    pub fn begin_run(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Supersede whatever run is current.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
    }

    /// Supersede `epoch` only if it is still the current run.
    pub fn invalidate_if_current(&mut self, epoch: u64) -> bool {
        if self.is_current(epoch) {
            self.invalidate();
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Incremented on every conversation reset.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    // ========================================================================
    // Board
    // ========================================================================

    pub fn set_stage(&mut self, index: usize, status: StageStatus) -> bool {
        let changed = self.board.set_status(index, status);
        if changed {
            self.events.emit(PipelineEvent::StageChanged { index, status });
        }
        changed
    }

    /// Return every stage to Idle.
    pub fn reset_board(&mut self) {
        self.board.reset(self.stage_count);
        for index in 1..=self.stage_count {
            self.events.emit(PipelineEvent::StageChanged {
                index,
                status: StageStatus::Idle,
            });
        }
    }

    pub fn set_status(&mut self, status: RunStatus) {
        self.status = status;
        self.events.emit(PipelineEvent::RunStatusChanged { status });
    }

    pub fn set_verdict(&mut self, verdict: Verdict) {
        self.verdict = verdict.clone();
        self.events.emit(PipelineEvent::VerdictChanged { verdict });
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn board(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn start_timer(&mut self) {
        self.elapsed.start();
    }

    pub fn stop_timer(&mut self) {
        self.elapsed.stop();
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            session_id: self.session_id,
            stages: self.board.snapshot(),
            status: self.status,
            verdict: self.verdict.clone(),
            elapsed_ms: self.elapsed.elapsed().as_millis() as u64,
            logs_paused: self.logs.is_paused(),
        }
    }

    // ========================================================================
    // Logs
    // ========================================================================

    /// Append to the log stream. Returns `false` if dropped by pause.
    pub fn log(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        provenance: Provenance,
    ) -> bool {
        let entry = LogEntry::new(level, message, provenance);
        let kept = self.logs.append(entry.clone());
        if kept {
            self.events.emit(PipelineEvent::LogAppended { entry });
        }
        kept
    }

    pub fn replace_logs(&mut self, entries: Vec<LogEntry>) {
        self.logs.replace(entries);
        self.events.emit(PipelineEvent::LogReplaced {
            len: self.logs.len(),
        });
    }

    pub fn clear_logs(&mut self) -> LogEntry {
        let marker = self.logs.clear().clone();
        self.events.emit(PipelineEvent::LogReplaced { len: 1 });
        marker
    }

    pub fn toggle_log_pause(&mut self) -> bool {
        self.logs.toggle_paused()
    }

    pub fn set_log_paused(&mut self, paused: bool) {
        self.logs.set_paused(paused);
    }

    pub fn logs(&self) -> &LogStream {
        &self.logs
    }

    // ========================================================================
    // Transcript
    // ========================================================================

    pub fn push_message(
        &mut self,
        sender: Sender,
        text: impl Into<String>,
        image: Option<String>,
    ) -> ConversationMessage {
        self.transcript.push(sender, text, image)
    }

    pub fn transcript(&self) -> &SessionTranscript {
        &self.transcript
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a new conversation: cancel the run and clear all session state.
    ///
    /// `stage_count` and `log_capacity` may change between sessions.
    pub fn reset(&mut self, stage_count: usize, log_capacity: usize) {
        self.invalidate();
        self.session_id += 1;
        self.stage_count = stage_count;
        self.reset_board();
        self.logs.reset(log_capacity);
        self.events.emit(PipelineEvent::LogReplaced { len: 0 });
        self.transcript.clear();
        self.elapsed.reset();
        self.set_verdict(Verdict::Idle);
        self.set_status(RunStatus::Idle);
    }

    /// Recompute the risk summary from the current snapshots.
    pub fn risk_summary(&self) -> RiskSummary {
        let entries = self.logs.entries();
        RiskSummaryEngine::summarize(&self.board.snapshot(), &entries, self.transcript.messages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_invalidation() {
        let mut state = PipelineState::new(3, 50);
        let first = state.begin_run();
        assert!(state.is_current(first));
        let second = state.begin_run();
        assert!(!state.is_current(first));
        assert!(!state.invalidate_if_current(first));
        assert!(state.is_current(second));
        assert!(state.invalidate_if_current(second));
        assert!(!state.is_current(second));
    }

    #[test]
    fn test_reset_clears_session() {
        let mut state = PipelineState::new(3, 50);
        state.set_stage(1, StageStatus::Done);
        state.log(LogLevel::Info, "hello", Provenance::Authoritative);
        state.push_message(Sender::User, "hi", None);
        state.set_log_paused(true);
        state.set_verdict(Verdict::Safe {
            provenance: Provenance::Simulated,
        });
        let epoch = state.epoch();

        state.reset(6, 10);

        assert_eq!(state.session_id(), 1);
        assert!(!state.is_current(epoch));
        assert_eq!(state.board().len(), 6);
        assert_eq!(state.board().count(StageStatus::Idle), 6);
        assert!(state.logs().is_empty());
        assert!(!state.logs().is_paused());
        assert_eq!(state.logs().capacity(), 10);
        assert!(state.transcript().is_empty());
        assert_eq!(state.verdict(), &Verdict::Idle);
        assert_eq!(state.status(), RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_writes_emit_events() {
        let mut state = PipelineState::new(2, 50);
        let mut rx = state.events().subscribe();

        assert!(!state.set_stage(7, StageStatus::Done));
        state.set_stage(2, StageStatus::Error);
        state.set_log_paused(true);
        assert!(!state.log(LogLevel::Info, "muted", Provenance::Simulated));

        assert_eq!(
            rx.recv().await.unwrap(),
            PipelineEvent::StageChanged {
                index: 2,
                status: StageStatus::Error
            }
        );
        assert!(rx.try_recv().is_err());
    }
}
