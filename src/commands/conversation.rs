//! Conversation Commands
//!
//! Submitting messages, starting a new conversation and reading the
//! transcript.

use promptguard_pipeline::{ConversationMessage, PipelineSnapshot};

use crate::models::response::CommandResponse;
use crate::services::session::SubmitOutcome;
use crate::state::AppState;

/// Submit a message (and optional image payload) for moderation
pub async fn submit_message(
    state: &AppState,
    message: String,
    image: Option<String>,
) -> Result<CommandResponse<SubmitOutcome>, String> {
    let session = match state.session().await {
        Ok(session) => session,
        Err(e) => return Ok(CommandResponse::err(e.to_string())),
    };
    Ok(session.submit(&message, image).await.into())
}

/// Reset board, logs and transcript
pub async fn new_conversation(
    state: &AppState,
) -> Result<CommandResponse<PipelineSnapshot>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.new_conversation().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}

/// Get the conversation transcript, oldest first
pub async fn get_transcript(
    state: &AppState,
) -> Result<CommandResponse<Vec<ConversationMessage>>, String> {
    match state.session().await {
        Ok(session) => Ok(CommandResponse::ok(session.transcript().await)),
        Err(e) => Ok(CommandResponse::err(e.to_string())),
    }
}
