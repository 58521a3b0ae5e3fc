//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients for the
//! moderation backend.

use std::time::Duration;

use promptguard_core::{BackendError, BackendResult};

/// User agent sent with every backend request.
pub const USER_AGENT: &str = concat!("promptguard-desktop/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with the given request timeout.
///
/// The timeout covers the whole request; hanging backends surface as a
/// transport error instead of an unbounded in-flight submission.
pub fn build_http_client(timeout: Duration) -> BackendResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| BackendError::transport(format!("failed to build HTTP client: {}", e)))
}
