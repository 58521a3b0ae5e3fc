//! Moderation Session Service
//!
//! Submission control flow for one dashboard session: starts the simulated
//! progression, sends the message to the moderation backend, then applies
//! the authoritative result. At most one submission is in flight at a time;
//! a second one is rejected rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use promptguard_core::{
    ConversationsResponse, ModerationBackend, ProcessRequest, ProcessResponse, ServerStatus,
    UserStatus,
};
use promptguard_pipeline::{
    BoardSnapshot, ConversationMessage, FlavorScript, LogEntry, LogLevel, PipelineSnapshot,
    PipelineState, Provenance, ReconciliationEngine, ReconciliationOutcome, RiskSummary,
    RunStatus, Sender, SharedPipeline, SimulationDriver, Verdict,
};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

/// Shown in the transcript when the backend cannot be reached.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Sorry, the security backend could not be reached. Please try again.";

pub const NEW_CONVERSATION_LOG: &str = "=== NEW CONVERSATION ===";

fn greeting(stage_count: usize) -> String {
    format!(
        "New conversation started. All interactions are monitored by our {}-layer security system.",
        stage_count
    )
}

/// Result of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The backend accepted the message and returned a model reply
    Replied {
        reply: ConversationMessage,
        severity: Option<String>,
        reconciliation: Option<ReconciliationOutcome>,
    },
    /// The backend refused the message (`success = false`)
    Blocked {
        reason: String,
        severity: Option<String>,
        reconciliation: Option<ReconciliationOutcome>,
    },
    /// Transport, status or decode failure
    Failed { error: String },
    /// The conversation was reset while the request was in flight
    Discarded,
}

/// Per-session settings derived from `AppConfig`.
#[derive(Debug, Clone)]
struct SessionSettings {
    user_id: String,
    stage_count: usize,
    log_capacity: usize,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_id: config.user_id.clone(),
            stage_count: config.stage_count,
            log_capacity: config.log_capacity,
        }
    }
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ModerationSession {
    pipeline: SharedPipeline,
    backend: RwLock<Arc<dyn ModerationBackend>>,
    driver: RwLock<SimulationDriver>,
    settings: RwLock<SessionSettings>,
    processing: AtomicBool,
}

impl ModerationSession {
    /// Create a session and open its first conversation.
    pub fn new(backend: Arc<dyn ModerationBackend>, config: &AppConfig) -> Self {
        let settings = SessionSettings::from(config);
        let mut state = PipelineState::new(settings.stage_count, settings.log_capacity);
        Self::open_conversation(&mut state, settings.stage_count);
        let pipeline = state.shared();
        let driver = SimulationDriver::new(
            pipeline.clone(),
            config.simulation.to_config(),
            FlavorScript::default(),
        );
        Self {
            pipeline,
            backend: RwLock::new(backend),
            driver: RwLock::new(driver),
            settings: RwLock::new(settings),
            processing: AtomicBool::new(false),
        }
    }

    fn open_conversation(state: &mut PipelineState, stage_count: usize) {
        state.push_message(Sender::System, greeting(stage_count), None);
        state.log(LogLevel::System, NEW_CONVERSATION_LOG, Provenance::Authoritative);
    }

    /// Shared pipeline state, for renderers and tests.
    pub fn pipeline(&self) -> SharedPipeline {
        self.pipeline.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub async fn backend_name(&self) -> String {
        self.backend.read().await.name().to_string()
    }

    /// Swap the moderation backend (e.g. after the backend URL changed).
    pub async fn set_backend(&self, backend: Arc<dyn ModerationBackend>) {
        *self.backend.write().await = backend;
    }

    /// Apply new settings. Board size and log capacity take effect at the
    /// next conversation; user id and simulation timing immediately.
    pub async fn apply_settings(&self, config: &AppConfig) {
        *self.settings.write().await = SessionSettings::from(config);
        *self.driver.write().await = SimulationDriver::new(
            self.pipeline.clone(),
            config.simulation.to_config(),
            FlavorScript::default(),
        );
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Submit a message for moderation.
    ///
    /// Rejected with `Validation` when there is neither text nor an image and
    /// with `Busy` while another submission is in flight. Every backend
    /// outcome, including failure, is reported as `Ok(SubmitOutcome)`.
    pub async fn submit(&self, text: &str, image: Option<String>) -> AppResult<SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(AppError::validation("Message cannot be empty"));
        }
        let _guard = ProcessingGuard::acquire(&self.processing)
            .ok_or_else(|| AppError::busy("A message is already being processed"))?;

        let user_id = self.settings.read().await.user_id.clone();
        let session_id = {
            let mut state = self.pipeline.write().await;
            state.push_message(Sender::User, text, image);
            state.session_id()
        };

        let driver = self.driver.read().await.clone();
        let canceller = driver.start().await.canceller();

        let backend = self.backend.read().await.clone();
        debug!(backend = backend.name(), "sending message to moderation backend");
        let result = backend.process(&ProcessRequest::new(text, user_id)).await;

        // Stop the simulation before taking the lock for the authoritative write.
        let keeps_simulation = matches!(&result, Ok(r) if r.success && r.layer_results().is_none());
        if !keeps_simulation {
            canceller.cancel().await;
        }

        let mut state = self.pipeline.write().await;
        if state.session_id() != session_id {
            info!("conversation reset while request was in flight; discarding response");
            return Ok(SubmitOutcome::Discarded);
        }

        let outcome = match result {
            Ok(response) => Self::apply_response(&mut state, response),
            Err(e) => {
                warn!(error = %e, "moderation request failed");
                state.set_status(RunStatus::Failed);
                state.stop_timer();
                state.push_message(Sender::System, TRANSPORT_FAILURE_MESSAGE, None);
                state.log(
                    LogLevel::Error,
                    format!("Backend request failed: {}", e),
                    Provenance::Authoritative,
                );
                SubmitOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        drop(state);

        if keeps_simulation {
            debug!(epoch = canceller.epoch(), "no layer data; simulation left running");
        }
        Ok(outcome)
    }

    fn apply_response(state: &mut PipelineState, response: ProcessResponse) -> SubmitOutcome {
        let reconciliation = response
            .layer_results()
            .map(|layers| ReconciliationEngine::apply(state, layers));

        if response.success {
            let text = response.text().unwrap_or_default().to_string();
            let reply = state.push_message(Sender::Model, text, None);
            return SubmitOutcome::Replied {
                reply,
                severity: response.severity,
                reconciliation,
            };
        }

        let reason = response.block_reason();
        info!(reason = %reason, "message blocked by moderation backend");
        if reconciliation.is_none() {
            // Stages stay as the simulation left them.
            state.set_status(RunStatus::Blocked);
            state.set_verdict(Verdict::Blocked {
                at_stage: None,
                reason: reason.clone(),
                provenance: Provenance::Authoritative,
            });
            state.stop_timer();
        }
        state.push_message(Sender::System, reason.clone(), None);
        state.log(LogLevel::Danger, reason.clone(), Provenance::Authoritative);
        SubmitOutcome::Blocked {
            reason,
            severity: response.severity,
            reconciliation,
        }
    }

    // ========================================================================
    // Conversation lifecycle
    // ========================================================================

    /// Cancel any run, clear board, logs and transcript, and greet.
    pub async fn new_conversation(&self) -> PipelineSnapshot {
        let settings = self.settings.read().await.clone();
        let mut state = self.pipeline.write().await;
        state.reset(settings.stage_count, settings.log_capacity);
        Self::open_conversation(&mut state, settings.stage_count);
        info!(session_id = state.session_id(), "new conversation started");
        state.snapshot()
    }

    // ========================================================================
    // Read models
    // ========================================================================

    pub async fn snapshot(&self) -> PipelineSnapshot {
        self.pipeline.read().await.snapshot()
    }

    pub async fn board(&self) -> BoardSnapshot {
        self.pipeline.read().await.board()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.pipeline.read().await.logs().entries()
    }

    /// Flip the log mute; returns the new paused state.
    pub async fn toggle_log_pause(&self) -> bool {
        self.pipeline.write().await.toggle_log_pause()
    }

    pub async fn clear_logs(&self) -> LogEntry {
        self.pipeline.write().await.clear_logs()
    }

    pub async fn risk_summary(&self) -> RiskSummary {
        self.pipeline.read().await.risk_summary()
    }

    pub async fn transcript(&self) -> Vec<ConversationMessage> {
        self.pipeline.read().await.transcript().messages().to_vec()
    }

    // ========================================================================
    // Secondary backend reads
    // ========================================================================

    pub async fn recent_conversations(&self) -> AppResult<ConversationsResponse> {
        let backend = self.backend.read().await.clone();
        Ok(backend.recent_conversations().await?)
    }

    /// Status of `user_id`, or of the configured user.
    pub async fn user_status(&self, user_id: Option<&str>) -> AppResult<UserStatus> {
        let user_id = match user_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => self.settings.read().await.user_id.clone(),
        };
        let backend = self.backend.read().await.clone();
        Ok(backend.user_status(&user_id).await?)
    }

    pub async fn server_status(&self) -> AppResult<ServerStatus> {
        let backend = self.backend.read().await.clone();
        Ok(backend.server_status().await?)
    }
}

impl std::fmt::Debug for ModerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationSession")
            .field("processing", &self.is_processing())
            .finish()
    }
}
