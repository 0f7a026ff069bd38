//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use interview_assist_core::ProxyConfig;
use interview_assist_llm::{ProviderConfig, ProviderType};
use serde::{Deserialize, Serialize};

/// Which primary path the solution orchestrator takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SolutionMode {
    /// One JSON call producing analysis, brute force, strategy and implementation
    #[default]
    Narrative,
    /// Brute force then optimize, two markdown calls
    Detailed,
    /// One JSON call with four independently-defaulted sections
    FourQuadrant,
}

impl SolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionMode::Narrative => "narrative",
            SolutionMode::Detailed => "detailed",
            SolutionMode::FourQuadrant => "four_quadrant",
        }
    }
}

impl std::str::FromStr for SolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "narrative" => Ok(SolutionMode::Narrative),
            "detailed" => Ok(SolutionMode::Detailed),
            "four_quadrant" => Ok(SolutionMode::FourQuadrant),
            other => Err(format!(
                "Invalid solution mode: {}. Must be 'narrative', 'detailed', or 'four_quadrant'",
                other
            )),
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// LLM provider used for every call
    pub api_provider: ProviderType,
    /// API key for the provider (empty = not configured)
    #[serde(default)]
    pub api_key: String,
    /// Base URL override for the provider endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model used for text-only solution calls
    pub solution_model: String,
    /// Model used for screenshot (vision) calls
    pub extraction_model: String,
    /// Programming language solutions are written in
    #[serde(default = "default_language")]
    pub language: String,
    /// Primary orchestration path
    #[serde(default)]
    pub solution_mode: SolutionMode,
    /// Maximum tokens to generate per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Outbound proxy for provider traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// Directory holding amazon_lps.json and behavioral_stories.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_language() -> String {
    "python".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for AppConfig {
    fn default() -> Self {
        let provider = ProviderType::OpenAI;
        Self {
            api_provider: provider,
            api_key: String::new(),
            base_url: None,
            solution_model: provider.default_model().to_string(),
            extraction_model: provider.default_model().to_string(),
            language: default_language(),
            solution_mode: SolutionMode::default(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            proxy: None,
            data_dir: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub api_provider: Option<ProviderType>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub solution_model: Option<String>,
    pub extraction_model: Option<String>,
    pub language: Option<String>,
    pub solution_mode: Option<SolutionMode>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub proxy: Option<ProxyConfig>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Apply a partial update to the configuration.
    ///
    /// Switching provider without naming models resets both models to the
    /// new provider's defaults, since model names do not carry across vendors.
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.api_provider {
            if provider != self.api_provider {
                self.api_provider = provider;
                self.solution_model = provider.default_model().to_string();
                self.extraction_model = provider.default_model().to_string();
            }
        }
        if let Some(key) = update.api_key {
            self.api_key = key;
        }
        if let Some(url) = update.base_url {
            self.base_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(model) = update.solution_model {
            self.solution_model = model;
        }
        if let Some(model) = update.extraction_model {
            self.extraction_model = model;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(mode) = update.solution_mode {
            self.solution_mode = mode;
        }
        if let Some(max) = update.max_tokens {
            self.max_tokens = max;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = Some(proxy);
        }
        if let Some(dir) = update.data_dir {
            self.data_dir = Some(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.solution_model.trim().is_empty() {
            return Err("solution_model cannot be empty".to_string());
        }
        if self.extraction_model.trim().is_empty() {
            return Err("extraction_model cannot be empty".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("language cannot be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if let Some(proxy) = &self.proxy {
            proxy.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Whether an API key has been entered
    pub fn api_key_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Provider configuration for a call on `model`
    pub fn provider_config(&self, model: &str) -> ProviderConfig {
        ProviderConfig {
            provider: self.api_provider,
            api_key: if self.api_key_configured() {
                Some(self.api_key.clone())
            } else {
                None
            },
            base_url: self.base_url.clone(),
            model: model.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }
}
