//! PromptGuard Desktop - Backend Library
//!
//! Dashboard backend that sends user messages to a remote moderation backend
//! and visualizes its multi-layer decision pipeline. It includes:
//! - Command handlers for front ends
//! - The moderation session service (submission control flow) and log export
//! - Storage layer (JSON config)
//! - Data models, utilities and the terminal front end

pub mod commands;
pub mod console;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used items from commands
pub use commands::{
    // Conversation commands
    get_transcript, new_conversation, submit_message,
    // Pipeline commands
    clear_logs, get_board, get_logs, get_risk_summary, toggle_log_pause,
    // Backend commands
    get_server_status, get_user_status, list_recent_conversations,
    // Export commands
    export_logs,
    // Settings commands
    get_settings, update_settings,
    // Health commands
    get_health,
};
// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::session::{ModerationSession, SubmitOutcome};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
