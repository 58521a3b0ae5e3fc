//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod export;
pub mod session;

pub use export::write_log_export;
pub use session::{ModerationSession, SubmitOutcome};
