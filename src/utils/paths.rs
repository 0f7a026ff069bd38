//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.interview-assist/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the application directory (~/.interview-assist/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".interview-assist"))
}

/// Get the config file path (~/.interview-assist/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

/// Get the default behavioral data directory (~/.interview-assist/data/)
pub fn data_dir() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("data"))
}

/// Get the default screenshot directory (~/.interview-assist/screenshots/)
pub fn screenshots_dir() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("screenshots"))
}

/// Get the extra (debug) screenshot directory (~/.interview-assist/extra_screenshots/)
pub fn extra_screenshots_dir() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("extra_screenshots"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the application directory, creating if it doesn't exist
pub fn ensure_app_dir() -> AppResult<PathBuf> {
    let path = app_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
