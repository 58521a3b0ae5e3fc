//! Export Commands

use chrono::Utc;

use crate::models::response::CommandResponse;
use crate::services::export::write_log_export;
use crate::state::AppState;

/// Write the "download logs" file; returns its path
pub async fn export_logs(state: &AppState) -> Result<CommandResponse<String>, String> {
    let dir = match state.export_dir().await {
        Ok(dir) => dir,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    match write_log_export(&dir, Utc::now()) {
        Ok(path) => Ok(CommandResponse::ok(path.display().to_string())),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
