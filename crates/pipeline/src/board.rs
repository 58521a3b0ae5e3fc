//! Stage Board
//!
//! Per-stage visualization status for an ordered, contiguous set of stages
//! `1..=N`. Pure state: no timing, no transition validation. Callers decide
//! the order in which statuses change.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::models::{Stage, StageStatus};

/// Ordered mapping `index -> Stage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBoard {
    stages: Vec<StageStatus>,
}

impl StageBoard {
    /// Create a board with `n` idle stages.
    pub fn new(n: usize) -> Self {
        Self {
            stages: vec![StageStatus::Idle; n],
        }
    }

    /// Reinitialize to `n` idle stages.
    pub fn reset(&mut self, n: usize) {
        self.stages.clear();
        self.stages.resize(n, StageStatus::Idle);
    }

    /// Overwrite one stage's status.
    ///
    /// Indices outside `1..=len` are ignored and `false` is returned; views may
    /// render fewer stages than the backend reports.
    pub fn set_status(&mut self, index: usize, status: StageStatus) -> bool {
        match index.checked_sub(1).and_then(|i| self.stages.get_mut(i)) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => false,
        }
    }

    /// Status of one stage.
    pub fn status(&self, index: usize) -> Option<StageStatus> {
        index
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of stages currently in `status`.
    pub fn count(&self, status: StageStatus) -> usize {
        self.stages.iter().filter(|s| **s == status).count()
    }

    pub fn processing_count(&self) -> usize {
        self.count(StageStatus::Processing)
    }

    /// Immutable copy for rendering.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            stages: self
                .stages
                .iter()
                .enumerate()
                .map(|(i, status)| Stage {
                    index: i + 1,
                    status: *status,
                })
                .collect(),
        }
    }
}

/// Immutable copy of a `StageBoard`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub stages: Vec<Stage>,
}

impl BoardSnapshot {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn count(&self, status: StageStatus) -> usize {
        self.stages.iter().filter(|s| s.status == status).count()
    }

    /// Status of the 1-based stage `index`.
    pub fn status(&self, index: usize) -> Option<StageStatus> {
        index
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .map(|s| s.status)
    }

    /// Statuses in index order.
    pub fn statuses(&self) -> Vec<StageStatus> {
        self.stages.iter().map(|s| s.status).collect()
    }
}

/// Elapsed-time counter shown next to the verdict.
///
/// Uses `tokio::time::Instant` so paused-clock tests see simulated time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedTimer {
    started: Option<Instant>,
    frozen: Option<Duration>,
}

impl ElapsedTimer {
    /// Restart from zero.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.frozen = None;
    }

    /// Freeze at the current reading. No-op if not running.
    pub fn stop(&mut self) {
        if let (Some(started), None) = (self.started, self.frozen) {
            self.frozen = Some(started.elapsed());
        }
    }

    /// Back to `00.00s`.
    pub fn reset(&mut self) {
        self.started = None;
        self.frozen = None;
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.frozen.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started, self.frozen) {
            (_, Some(frozen)) => frozen,
            (Some(started), None) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }
}
