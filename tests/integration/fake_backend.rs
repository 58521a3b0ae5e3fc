//! Scripted in-memory moderation backend.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use promptguard_core::{
    BackendError, BackendResult, ConversationPreview, ConversationsResponse, LayerMap,
    LayerResult, ModerationBackend, ProcessRequest, ProcessResponse, ServerStatus, UserStatus,
};

pub struct FakeBackend {
    response: Mutex<BackendResult<ProcessResponse>>,
    delay: Duration,
    requests: Mutex<Vec<ProcessRequest>>,
}

impl FakeBackend {
    pub fn new(response: BackendResult<ProcessResponse>, delay: Duration) -> Self {
        Self {
            response: Mutex::new(response),
            delay,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `success = true` with a model reply and the given layers.
    pub fn replying(reply: &str, layers: Option<LayerMap>, delay: Duration) -> Self {
        Self::new(
            Ok(ProcessResponse {
                success: true,
                message: Some(reply.to_string()),
                severity: Some("SAFE".to_string()),
                layers,
                ..Default::default()
            }),
            delay,
        )
    }

    /// `success = false` with a block reason and no layers.
    pub fn blocking(reason: &str, delay: Duration) -> Self {
        Self::new(
            Ok(ProcessResponse {
                success: false,
                message: Some(reason.to_string()),
                ..Default::default()
            }),
            delay,
        )
    }

    pub fn failing(delay: Duration) -> Self {
        Self::new(Err(BackendError::transport("connection refused")), delay)
    }

    pub fn set_response(&self, response: BackendResult<ProcessResponse>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// layer1 passes, layer2 fails with "high entropy", layer3 passes.
pub fn entropy_block_layers() -> LayerMap {
    let mut layers = LayerMap::new();
    layers.insert("layer1".to_string(), LayerResult::passed(""));
    layers.insert("layer2".to_string(), LayerResult::failed("high entropy"));
    layers.insert("layer3".to_string(), LayerResult::passed(""));
    layers
}

#[async_trait]
impl ModerationBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn process(&self, request: &ProcessRequest) -> BackendResult<ProcessResponse> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.response.lock().unwrap().clone()
    }

    async fn recent_conversations(&self) -> BackendResult<ConversationsResponse> {
        Ok(ConversationsResponse {
            success: true,
            conversations: vec![ConversationPreview {
                preview: "how do I reset my password".to_string(),
                timestamp: "2025-01-01T10:00:00".to_string(),
                user_id: "demo_user_01".to_string(),
            }],
        })
    }

    async fn user_status(&self, user_id: &str) -> BackendResult<UserStatus> {
        let mut status = UserStatus::default();
        if user_id == "repeat_offender" {
            status.status = "HIGH_RISK".to_string();
            status.score = 42;
        }
        Ok(status)
    }

    async fn server_status(&self) -> BackendResult<ServerStatus> {
        Ok(ServerStatus {
            success: true,
            status: "Server is running".to_string(),
            layers: "Active".to_string(),
        })
    }
}
