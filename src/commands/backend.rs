//! Backend Commands
//!
//! Secondary read endpoints of the moderation backend.

use promptguard_core::{ConversationsResponse, ServerStatus, UserStatus};

use crate::models::response::CommandResponse;
use crate::state::AppState;

/// Recent conversation previews
pub async fn list_recent_conversations(
    state: &AppState,
) -> Result<CommandResponse<ConversationsResponse>, String> {
    match state.session().await {
        Ok(session) => Ok(session.recent_conversations().await.into()),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Risk status of a user (the configured user when `user_id` is None)
pub async fn get_user_status(
    state: &AppState,
    user_id: Option<String>,
) -> Result<CommandResponse<UserStatus>, String> {
    match state.session().await {
        Ok(session) => Ok(session.user_status(user_id.as_deref()).await.into()),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Backend health probe
pub async fn get_server_status(state: &AppState) -> Result<CommandResponse<ServerStatus>, String> {
    match state.session().await {
        Ok(session) => Ok(session.server_status().await.into()),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
