//! Log Export Service
//!
//! Writes the "download logs" file into the export directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::export::LogExport;
use crate::utils::error::AppResult;
use crate::utils::paths::ensure_dir;

/// Write the sample export for `now` into `dir` and return the file path.
pub fn write_log_export(dir: &Path, now: DateTime<Utc>) -> AppResult<PathBuf> {
    ensure_dir(dir)?;
    let export = LogExport::sample(now);
    let path = dir.join(export.file_name());
    fs::write(&path, serde_json::to_string_pretty(&export)?)?;
    info!(path = %path.display(), "exported logs");
    Ok(path)
}
