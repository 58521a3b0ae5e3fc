//! Integration Tests Module
//!
//! End-to-end tests for PromptGuard Desktop against an in-memory moderation
//! backend. No network access is needed; simulated time is used throughout.

// Scripted ModerationBackend used by every test
mod fake_backend;

// Submission control flow: simulation, reconciliation, blocking, failures
mod session_test;

// Command surface over AppState
mod commands_test;
