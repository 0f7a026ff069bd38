//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file, and the
//! `SettingsSource` seam through which services re-read settings per call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_app_dir};

/// Read-only access to the current settings snapshot.
///
/// Implementations are consulted on every LLM call so that a changed
/// provider, key or model takes effect without restarting a session.
pub trait SettingsSource: Send + Sync {
    fn current_settings(&self) -> AppResult<AppConfig>;
}

/// A fixed snapshot, used by tests and one-shot CLI runs
impl SettingsSource for AppConfig {
    fn current_settings(&self) -> AppResult<AppConfig> {
        Ok(self.clone())
    }
}

/// A live, updatable config service shared with the host
impl SettingsSource for RwLock<ConfigService> {
    fn current_settings(&self) -> AppResult<AppConfig> {
        self.read()
            .map(|service| service.get_config_clone())
            .map_err(|_| AppError::internal("config lock poisoned"))
    }
}

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Create a new config service at ~/.interview-assist/config.json
    pub fn new() -> AppResult<Self> {
        ensure_app_dir()?;
        Self::open(config_path()?)
    }

    /// Open (or create with defaults) the config file at `path`
    pub fn open(config_path: PathBuf) -> AppResult<Self> {
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            info!(path = %config_path.display(), "created default config");
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        debug!(path = %path.display(), provider = %config.api_provider, "loaded config");
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    /// Update the configuration with a partial update.
    ///
    /// An update that fails validation leaves both memory and disk untouched.
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut candidate = self.config.clone();
        candidate.apply_update(update);
        Self::save_to_file(&self.config_path, &candidate)?;
        self.config = candidate;
        Ok(self.config.clone())
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(&mut self) -> AppResult<()> {
        self.config = AppConfig::default();
        self.save()?;
        Ok(())
    }

    /// Whether an API key has been entered
    pub fn api_key_configured(&self) -> bool {
        self.config.api_key_configured()
    }

    /// Check if the config service is healthy
    pub fn is_healthy(&self) -> bool {
        self.config_path.exists() && self.config.validate().is_ok()
    }
}
