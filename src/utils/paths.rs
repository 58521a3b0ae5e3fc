//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.promptguard/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the PromptGuard directory (~/.promptguard/)
pub fn promptguard_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".promptguard"))
}

/// Get the config file path (~/.promptguard/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(promptguard_dir()?.join("config.json"))
}

/// Get the default log export directory (~/.promptguard/exports/)
pub fn exports_dir() -> AppResult<PathBuf> {
    Ok(promptguard_dir()?.join("exports"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
