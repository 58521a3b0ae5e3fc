//! Pipeline Commands
//!
//! Read-only projections of the stage board and log stream, plus the log
//! stream's pause and clear controls.

use promptguard_pipeline::{LogEntry, PipelineSnapshot, RiskSummary};

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Get the board, run status, verdict and elapsed time
pub async fn get_board(state: &AppState) -> Result<CommandResponse<PipelineSnapshot>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.snapshot().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Get the log stream, oldest first
pub async fn get_logs(state: &AppState) -> Result<CommandResponse<Vec<LogEntry>>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.logs().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Mute or unmute the log stream; returns the new paused state
pub async fn toggle_log_pause(state: &AppState) -> Result<CommandResponse<bool>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.toggle_log_pause().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Clear the log stream; returns the "cleared" marker entry
pub async fn clear_logs(state: &AppState) -> Result<CommandResponse<LogEntry>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.clear_logs().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Compute the heuristic risk summary
pub async fn get_risk_summary(state: &AppState) -> Result<CommandResponse<RiskSummary>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.risk_summary().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
