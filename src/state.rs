//! Application State
//!
//! Global state shared by all commands, containing all services.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use promptguard_client::HttpModerationBackend;
use promptguard_core::ModerationBackend;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::session::ModerationSession;
use crate::storage::ConfigService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::exports_dir;

/// Application state shared by the command layer
pub struct AppState {
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// The active moderation session
    session: Arc<RwLock<Option<Arc<ModerationSession>>>>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            session: Arc::new(RwLock::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize from an already loaded config, talking HTTP to the
    /// configured backend
    pub async fn initialize(&self, config: ConfigService) -> AppResult<()> {
        let backend = Self::http_backend(config.get_config())?;
        self.initialize_with(config, backend).await
    }

    /// Initialize with an explicit backend
    pub async fn initialize_with(
        &self,
        config: ConfigService,
        backend: Arc<dyn ModerationBackend>,
    ) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let session = ModerationSession::new(backend, config.get_config());
        info!(
            backend = session.backend_name().await,
            stages = config.get_config().stage_count,
            "moderation session ready"
        );

        *self.session.write().await = Some(Arc::new(session));
        *self.config.write().await = Some(config);

        *initialized = true;
        Ok(())
    }

    fn http_backend(config: &AppConfig) -> AppResult<Arc<dyn ModerationBackend>> {
        let backend = HttpModerationBackend::new(&config.backend_url, config.request_timeout())?;
        Ok(Arc::new(backend))
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Check if the session has been created
    pub fn is_session_ready(&self) -> bool {
        self.session
            .try_read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Get the active session.
    ///
    /// Returns a cloned handle so no lock is held while a submission awaits
    /// the backend.
    pub async fn session(&self) -> AppResult<Arc<ModerationSession>> {
        let guard = self.session.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::internal("Moderation session not initialized"))
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration and push it to the session.
    ///
    /// The replacement backend is built from the candidate config before
    /// anything is saved, so a rejected update leaves memory and disk as
    /// they were.
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let session = self.session().await?;
        let (updated, backend) = {
            let mut guard = self.config.write().await;
            let config = guard
                .as_mut()
                .ok_or_else(|| AppError::config("Config service not initialized"))?;
            let candidate = config.preview_update(update.clone())?;
            let backend = if config.get_config().backend_changed(&candidate) {
                Some(Self::http_backend(&candidate)?)
            } else {
                None
            };
            (config.update_config(update)?, backend)
        };

        if let Some(backend) = backend {
            session.set_backend(backend).await;
            info!(url = %updated.backend_url, "moderation backend reconfigured");
        }
        session.apply_settings(&updated).await;
        Ok(updated)
    }

    /// Directory for "download logs" files
    pub async fn export_dir(&self) -> AppResult<PathBuf> {
        match self.get_config().await?.export_dir {
            Some(dir) => Ok(dir),
            None => exports_dir(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
