//! Reconciliation Engine
//!
//! Overwrites simulated board and log state with the backend's per-layer
//! results. The rewrite is total: the board is reset before any mark is
//! applied, so the outcome never depends on how far the simulation got.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use promptguard_core::{parse_layer_key, LayerMap, LayerResult};

use crate::models::{LogEntry, LogLevel, Provenance, RunStatus, StageStatus, Verdict};
use crate::state::PipelineState;

/// What one reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// Smallest failing layer index, over every reported layer
    pub blocked_at: Option<usize>,
    pub verdict: Verdict,
    /// Number of layers marked on the board
    pub applied: usize,
    /// Keys that are not of the form `layer<k>`
    pub ignored_keys: Vec<String>,
}

pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Apply the authoritative layer mapping to `state`.
    ///
    /// Applying the same mapping twice leaves the same board and log content.
    pub fn apply(state: &mut PipelineState, layers: &LayerMap) -> ReconciliationOutcome {
        state.invalidate();

        let (ordered, ignored_keys) = Self::order(layers);
        for key in &ignored_keys {
            warn!(key = %key, "ignoring unrecognized layer key");
        }

        let entries = ordered
            .iter()
            .map(|(_, result)| {
                let level = if result.passed {
                    LogLevel::Info
                } else {
                    LogLevel::Danger
                };
                LogEntry::authoritative(level, result.display_message())
            })
            .collect();
        state.replace_logs(entries);

        state.reset_board();
        let mut applied = 0;
        for (index, result) in &ordered {
            let status = if result.passed {
                StageStatus::Done
            } else {
                StageStatus::Error
            };
            if state.set_stage(*index, status) {
                applied += 1;
            }
        }

        let blocked = ordered.iter().find(|(_, result)| !result.passed);
        let blocked_at = blocked.map(|(index, _)| *index);
        let verdict = match blocked {
            Some((index, result)) => Verdict::Blocked {
                at_stage: Some(*index),
                reason: result.display_message().to_string(),
                provenance: Provenance::Authoritative,
            },
            None => Verdict::Safe {
                provenance: Provenance::Authoritative,
            },
        };

        state.set_status(if blocked_at.is_some() {
            RunStatus::Blocked
        } else {
            RunStatus::Complete
        });
        state.set_verdict(verdict.clone());
        state.stop_timer();

        info!(
            layers = ordered.len(),
            applied,
            blocked_at = ?blocked_at,
            "reconciled pipeline with backend result"
        );

        ReconciliationOutcome {
            blocked_at,
            verdict,
            applied,
            ignored_keys,
        }
    }

    /// Parse keys and sort layers numerically (`layer10` after `layer9`).
    fn order(layers: &LayerMap) -> (Vec<(usize, &LayerResult)>, Vec<String>) {
        let mut ordered = Vec::with_capacity(layers.len());
        let mut ignored = Vec::new();
        for (key, result) in layers {
            match parse_layer_key(key) {
                Ok(index) => ordered.push((index, result)),
                Err(_) => ignored.push(key.clone()),
            }
        }
        ordered.sort_by_key(|(index, _)| *index);
        ignored.sort();
        (ordered, ignored)
    }
}
