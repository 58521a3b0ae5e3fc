//! PromptGuard Core
//!
//! Foundational error types, backend wire types, and the moderation backend
//! trait for the PromptGuard Desktop workspace. This crate has zero
//! dependencies on application-level code (config files, HTTP, timers).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `BackendError`)
//! - `wire` - JSON bodies exchanged with the moderation backend
//! - `backend` - The `ModerationBackend` trait
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/async-trait/thiserror** - keeps build times minimal
//! 2. **Trait-based abstractions** - enables mocking the backend in tests
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod backend;
pub mod error;
pub mod wire;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{BackendError, BackendResult, CoreError, CoreResult};

// ── Backend Trait ──────────────────────────────────────────────────────
pub use backend::ModerationBackend;

// ── Wire Types ─────────────────────────────────────────────────────────
pub use wire::{
    layer_key, parse_layer_key, BackendLogLine, ConversationPreview, ConversationsResponse,
    LayerMap, LayerResult, ProcessRequest, ProcessResponse, ServerStatus, UserEvent, UserStatus,
    DEFAULT_USER_ID,
};
