//! Health Check Commands
//!
//! Commands for checking the health status of backend services.

use crate::models::response::{CommandResponse, HealthResponse};
use crate::state::AppState;

/// Get the health status of the application services
pub async fn get_health(state: &AppState) -> Result<CommandResponse<HealthResponse>, String> {
    let mut health = HealthResponse::default();

    health.config = state.is_config_healthy();
    health.session = state.is_session_ready();
    if let Ok(session) = state.session().await {
        health.backend = Some(session.backend_name().await);
    }

    // Overall status
    health.status = if health.config && health.session {
        "healthy".to_string()
    } else {
        "degraded".to_string()
    };

    Ok(CommandResponse::ok(health))
}
