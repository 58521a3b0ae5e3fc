//! Simulation Driver
//!
//! Plays an optimistic, time-scripted progression through the stages while
//! the real moderation request is outstanding. Every entry it writes is
//! tagged `Simulated`; randomness only drives timing.
//!
//! A run is identified by the epoch captured at start. Each step re-checks
//! that epoch under the state lock, so a step scheduled before a cancel,
//! reset or reconciliation becomes a no-op. The cancellation token only
//! wakes sleeping steps early.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use promptguard_core::{CoreError, CoreResult};

use crate::events::PipelineEvent;
use crate::models::{LogLevel, Provenance, RunStatus, StageStatus, Verdict};
use crate::state::{PipelineState, SharedPipeline};

pub const RUN_STARTED_MESSAGE: &str = "=== BACKEND PROCESSING STARTED ===";
pub const RUN_COMPLETE_MESSAGE: &str = "=== PROCESSING COMPLETE: SAFE ===";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub start_delay: Duration,
    /// Lower bound of the per-stage duration, measured from stage start
    pub step_min: Duration,
    pub step_max: Duration,
    /// Pause between a stage completing and the next one starting
    pub settle_pause: Duration,
    /// Spacing of the flavor lines within a stage
    pub line_interval: Duration,
    /// Fixed RNG seed for reproducible timing
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(500),
            step_min: Duration::from_millis(1000),
            step_max: Duration::from_millis(2000),
            settle_pause: Duration::from_millis(800),
            line_interval: Duration::from_millis(300),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.step_min > self.step_max {
            return Err(CoreError::validation(format!(
                "step_min ({:?}) must not exceed step_max ({:?})",
                self.step_min, self.step_max
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Flavor script
// ============================================================================

/// One scripted line shown while a stage is "processing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorLine {
    pub level: LogLevel,
    pub text: String,
}

impl FlavorLine {
    fn process(text: &str) -> Self {
        Self {
            level: LogLevel::Process,
            text: text.to_string(),
        }
    }

    fn passed(stage: usize) -> Self {
        Self {
            level: LogLevel::Success,
            text: format!("Layer {} security check passed ✓", stage),
        }
    }
}

/// Flavor lines per stage. Stages past the end of the script have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorScript {
    stages: Vec<Vec<FlavorLine>>,
}

impl Default for FlavorScript {
    fn default() -> Self {
        let scripted: [&[&str]; 6] = [
            &[
                "Analyzing input structure...",
                "Scanning for injection patterns...",
                "Validating prompt format...",
            ],
            &[
                "Scanning output for content leakage...",
                "Checking entropy levels...",
                "Validating jailbreak protection...",
            ],
            &[
                "Applying governance rules...",
                "Risk scoring analysis...",
                "Generating security report...",
            ],
            &[
                "Filtering model output...",
                "Checking responses for secret leakage...",
            ],
            &[
                "Evaluating behavioral playbooks...",
                "Correlating repeated attempts...",
            ],
            &[
                "Recording forensic trail...",
                "Updating user risk profile...",
            ],
        ];
        let stages = scripted
            .iter()
            .enumerate()
            .map(|(i, lines)| {
                lines
                    .iter()
                    .map(|line| FlavorLine::process(line))
                    .chain(std::iter::once(FlavorLine::passed(i + 1)))
                    .collect()
            })
            .collect();
        Self { stages }
    }
}

impl FlavorScript {
    /// A script with no flavor lines at all.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn lines(&self, stage: usize) -> &[FlavorLine] {
        stage
            .checked_sub(1)
            .and_then(|i| self.stages.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ============================================================================
// Driver
// ============================================================================

/// How a simulation task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationExit {
    /// Every stage was visualized and the optimistic verdict written
    Completed,
    /// Cancelled, reset or reconciled before finishing
    Superseded,
}

#[derive(Debug, Clone)]
pub struct SimulationDriver {
    state: SharedPipeline,
    config: SimulationConfig,
    script: Arc<FlavorScript>,
}

impl SimulationDriver {
    pub fn new(state: SharedPipeline, config: SimulationConfig, script: FlavorScript) -> Self {
        Self {
            state,
            config,
            script: Arc::new(script),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Reset the board and spawn a new simulated run.
    ///
    /// Any previous run is superseded by the epoch bump.
    pub async fn start(&self) -> SimulationHandle {
        let (epoch, stage_count) = {
            let mut state = self.state.write().await;
            let epoch = state.begin_run();
            state.reset_board();
            state.set_verdict(Verdict::Idle);
            state.set_status(RunStatus::Processing);
            state.start_timer();
            state.log(LogLevel::System, RUN_STARTED_MESSAGE, Provenance::Simulated);
            (epoch, state.stage_count())
        };
        info!(epoch, stage_count, "simulation started");

        let token = CancellationToken::new();
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let run = SimulationRun {
            state: self.state.clone(),
            epoch,
            stage_count,
            token: token.clone(),
            config: self.config.clone(),
            script: self.script.clone(),
            rng,
        };
        let join = tokio::spawn(run.execute());

        SimulationHandle {
            join,
            canceller: SimulationCanceller {
                epoch,
                token,
                state: self.state.clone(),
            },
        }
    }
}

/// Cancels one specific run. Cloneable so the submission flow can keep it
/// while the handle is awaited elsewhere.
#[derive(Debug, Clone)]
pub struct SimulationCanceller {
    epoch: u64,
    token: CancellationToken,
    state: SharedPipeline,
}

impl SimulationCanceller {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Prevent any further step of this run from executing.
    pub async fn cancel(&self) {
        self.token.cancel();
        if self.state.write().await.invalidate_if_current(self.epoch) {
            debug!(epoch = self.epoch, "simulation cancelled");
        }
    }
}

#[derive(Debug)]
pub struct SimulationHandle {
    join: JoinHandle<SimulationExit>,
    canceller: SimulationCanceller,
}

impl SimulationHandle {
    pub fn epoch(&self) -> u64 {
        self.canceller.epoch
    }

    pub fn canceller(&self) -> SimulationCanceller {
        self.canceller.clone()
    }

    pub async fn cancel(&self) {
        self.canceller.cancel().await;
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to end.
    pub async fn wait(self) -> SimulationExit {
        match self.join.await {
            Ok(exit) => exit,
            Err(e) => {
                warn!(error = %e, "simulation task aborted");
                SimulationExit::Superseded
            }
        }
    }
}

struct SimulationRun {
    state: SharedPipeline,
    epoch: u64,
    stage_count: usize,
    token: CancellationToken,
    config: SimulationConfig,
    script: Arc<FlavorScript>,
    rng: StdRng,
}

impl SimulationRun {
    async fn execute(mut self) -> SimulationExit {
        let exit = self.drive().await;
        match exit {
            SimulationExit::Completed => info!(epoch = self.epoch, "simulation complete"),
            SimulationExit::Superseded => debug!(epoch = self.epoch, "simulation superseded"),
        }
        exit
    }

    async fn drive(&mut self) -> SimulationExit {
        if !self.pause(self.config.start_delay).await {
            return SimulationExit::Superseded;
        }

        for index in 1..=self.stage_count {
            let stage_start = Instant::now();
            let step = self.step_duration();

            let started = self
                .with_current(|state| {
                    state.set_stage(index, StageStatus::Processing);
                    state.log(
                        LogLevel::Process,
                        format!("Processing layer {}...", index),
                        Provenance::Simulated,
                    );
                })
                .await;
            if !started {
                return SimulationExit::Superseded;
            }

            let script = self.script.clone();
            for line in script.lines(index) {
                if !self.pause(self.config.line_interval).await {
                    return SimulationExit::Superseded;
                }
                let written = self
                    .with_current(|state| {
                        state.log(line.level, line.text.clone(), Provenance::Simulated);
                    })
                    .await;
                if !written {
                    return SimulationExit::Superseded;
                }
            }

            if !self.pause_until(stage_start + step).await {
                return SimulationExit::Superseded;
            }
            let finished = self
                .with_current(|state| {
                    state.set_stage(index, StageStatus::Done);
                    state.log(
                        LogLevel::Success,
                        format!("Layer {} processing completed", index),
                        Provenance::Simulated,
                    );
                })
                .await;
            if !finished {
                return SimulationExit::Superseded;
            }

            if !self.pause(self.config.settle_pause).await {
                return SimulationExit::Superseded;
            }
        }

        let completed = self
            .with_current(|state| {
                state.set_status(RunStatus::Complete);
                state.set_verdict(Verdict::Safe {
                    provenance: Provenance::Simulated,
                });
                state.log(LogLevel::Success, RUN_COMPLETE_MESSAGE, Provenance::Simulated);
                state.stop_timer();
                state.events().emit(PipelineEvent::CompletionEffect);
            })
            .await;
        if completed {
            SimulationExit::Completed
        } else {
            SimulationExit::Superseded
        }
    }

    fn step_duration(&mut self) -> Duration {
        let min = self.config.step_min.as_millis() as u64;
        let max = (self.config.step_max.as_millis() as u64).max(min);
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    /// Run `f` under the write lock if this run is still current.
    async fn with_current<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut PipelineState),
    {
        let mut state = self.state.write().await;
        if !state.is_current(self.epoch) {
            return false;
        }
        f(&mut *state);
        true
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = sleep(duration) => true,
        }
    }

    async fn pause_until(&self, deadline: Instant) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = sleep_until(deadline) => true,
        }
    }
}
