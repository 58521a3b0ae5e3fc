//! Moderation Backend Trait
//!
//! Defines the interface the dashboard uses to reach the remote moderation
//! backend. The HTTP implementation lives in the client crate; tests and the
//! application can substitute their own.

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::wire::{
    ConversationsResponse, ProcessRequest, ProcessResponse, ServerStatus, UserStatus,
};

/// Trait that all moderation backends must implement.
///
/// Only `process` participates in the pipeline visualization; the remaining
/// calls are read-only data sources for the surrounding dashboard.
#[async_trait]
pub trait ModerationBackend: Send + Sync {
    /// Returns the backend name for identification in logs.
    fn name(&self) -> &str;

    /// Submit a message to the moderation pipeline.
    ///
    /// A block (`success = false`) is returned as `Ok`. Only transport-level
    /// failures (non-2xx, network, decode) are `Err`.
    async fn process(&self, request: &ProcessRequest) -> BackendResult<ProcessResponse>;

    /// Recent conversation previews.
    async fn recent_conversations(&self) -> BackendResult<ConversationsResponse>;

    /// Profiler status for one user.
    async fn user_status(&self, user_id: &str) -> BackendResult<UserStatus>;

    /// Server liveness probe.
    async fn server_status(&self) -> BackendResult<ServerStatus>;
}
