//! PromptGuard Client
//!
//! HTTP implementation of the `ModerationBackend` trait and the reqwest
//! client factory it is built on.

pub mod http;
pub mod http_client;

// Re-export main types
pub use http::HttpModerationBackend;
pub use http_client::{build_http_client, USER_AGENT};
