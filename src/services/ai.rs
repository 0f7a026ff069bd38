//! AI Service
//!
//! The application's [`CompletionClient`]: re-reads settings on every call,
//! picks the model for the request and reuses the provider built for the same
//! [`ProviderConfig`]. A settings change yields a freshly built provider on
//! the next call; an existing provider is never mutated.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use interview_assist_llm::{
    complete_with_cancellation, create_provider, CompletionClient, CompletionRequest, LlmError,
    LlmProvider, LlmResult, ProviderConfig,
};

use crate::models::AppConfig;
use crate::storage::config::SettingsSource;

pub struct AiService {
    settings: Arc<dyn SettingsSource>,
    /// Provider built for the most recent configuration snapshot
    cached: Mutex<Option<Arc<dyn LlmProvider>>>,
}

impl AiService {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            settings,
            cached: Mutex::new(None),
        }
    }

    /// Explicit override, else the extraction model for vision requests,
    /// else the solution model
    pub fn resolve_model(config: &AppConfig, request: &CompletionRequest) -> String {
        match &request.model_override {
            Some(model) if !model.trim().is_empty() => model.clone(),
            _ if request.is_vision() => config.extraction_model.clone(),
            _ => config.solution_model.clone(),
        }
    }

    fn provider_for(&self, config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
        let mut cached = self.cached.lock().map_err(|_| LlmError::Other {
            message: "provider cache lock poisoned".to_string(),
        })?;

        if let Some(provider) = cached.as_ref() {
            if provider.config() == &config {
                return Ok(Arc::clone(provider));
            }
        }

        info!(provider = %config.provider, model = %config.model, "building provider");
        let provider = create_provider(config)?;
        *cached = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Current settings, rejected when no API key is set
    fn configured_settings(&self) -> LlmResult<AppConfig> {
        let settings = self
            .settings
            .current_settings()
            .map_err(|e| LlmError::Other {
                message: e.to_string(),
            })?;
        if !settings.api_key_configured() {
            return Err(LlmError::AuthenticationFailed {
                message: format!("{} API key is not configured", settings.api_provider),
            });
        }
        Ok(settings)
    }

    /// Ask the provider for the solution model to accept the configured key.
    /// Returns `provider (model)` on success.
    pub async fn check_connection(&self) -> LlmResult<String> {
        let settings = self.configured_settings()?;
        let provider = self.provider_for(settings.provider_config(&settings.solution_model))?;
        provider.health_check().await?;
        info!(
            provider = provider.name(),
            model = provider.model(),
            "connection check passed"
        );
        Ok(format!("{} ({})", provider.name(), provider.model()))
    }
}

#[async_trait]
impl CompletionClient for AiService {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> LlmResult<String> {
        if token.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let settings = self.configured_settings()?;
        let model = Self::resolve_model(&settings, &request);
        debug!(model = %model, vision = request.is_vision(), "resolved model");
        let provider = self.provider_for(settings.provider_config(&model))?;
        complete_with_cancellation(provider.as_ref(), request, token).await
    }
}
