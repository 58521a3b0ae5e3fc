//! HTTP Moderation Backend
//!
//! `ModerationBackend` implementation over the backend's JSON HTTP API:
//!
//! - `POST /api/process`
//! - `GET /api/conversations`
//! - `GET /api/user-status/:id`
//! - `GET /api/status`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use promptguard_core::{
    BackendError, BackendResult, ConversationsResponse, ModerationBackend, ProcessRequest,
    ProcessResponse, ServerStatus, UserStatus,
};

use crate::http_client::build_http_client;

/// Moderation backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpModerationBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpModerationBackend {
    /// Create a backend for `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url,
        })
    }

    /// Resolve an endpoint below the base URL, keeping any base path prefix.
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::InvalidUrl(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "moderation backend returned an error status");
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> BackendResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        Self::decode(response).await
    }
}

#[async_trait]
impl ModerationBackend for HttpModerationBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn process(&self, request: &ProcessRequest) -> BackendResult<ProcessResponse> {
        let url = self.endpoint(&["api", "process"])?;
        debug!(%url, user_id = %request.user_id, "submitting message for moderation");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;
        let body: ProcessResponse = Self::decode(response).await?;
        debug!(
            success = body.success,
            layers = body.layers.as_ref().map(|l| l.len()).unwrap_or(0),
            "moderation response received"
        );
        Ok(body)
    }

    async fn recent_conversations(&self) -> BackendResult<ConversationsResponse> {
        self.get(&["api", "conversations"]).await
    }

    async fn user_status(&self, user_id: &str) -> BackendResult<UserStatus> {
        self.get(&["api", "user-status", user_id]).await
    }

    async fn server_status(&self) -> BackendResult<ServerStatus> {
        self.get(&["api", "status"]).await
    }
}
