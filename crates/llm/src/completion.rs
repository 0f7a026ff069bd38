//! Cancellable Completion
//!
//! The single text-completion capability consumed by the solution pipeline:
//! a prompt, a system prompt, optional screenshots and a cancellation token
//! in, response text out.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::provider::LlmProvider;
use crate::types::{ImageData, LlmError, LlmRequestOptions, LlmResult, Message};

/// One completion call: prompt text plus an optional vision payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// User prompt
    pub prompt: String,
    /// System prompt (may be empty)
    pub system_prompt: String,
    /// Model to use instead of the configured one
    pub model_override: Option<String>,
    /// Base64-encoded screenshots with their MIME types
    pub images: Vec<ImageData>,
    /// Per-request sampling overrides
    pub options: LlmRequestOptions,
}

impl CompletionRequest {
    /// Text-only request
    pub fn new(prompt: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    /// Attach screenshots, turning this into a vision request
    pub fn with_images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }

    /// Force a specific model for this call
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    /// Override the sampling temperature for this call
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature_override = Some(temperature);
        self
    }

    /// Whether the request carries screenshots
    pub fn is_vision(&self) -> bool {
        !self.images.is_empty()
    }

    /// Convert into the single user message sent to a provider
    pub fn to_message(&self) -> Message {
        if self.images.is_empty() {
            Message::user(self.prompt.clone())
        } else {
            Message::user_with_images(self.prompt.clone(), &self.images)
        }
    }
}

/// Text completion with cooperative cancellation.
///
/// Implementations must return `LlmError::Cancelled` once `token` fires and
/// must not report success for a call whose token was cancelled.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
        token: &CancellationToken,
    ) -> LlmResult<String>;
}

/// Run one provider call, racing it against `token`.
///
/// A token that is already cancelled short-circuits before any network I/O,
/// as does a vision request to a text-only provider. A response without text
/// is reported as a parse error.
pub async fn complete_with_cancellation(
    provider: &dyn LlmProvider,
    request: CompletionRequest,
    token: &CancellationToken,
) -> LlmResult<String> {
    if token.is_cancelled() {
        return Err(LlmError::Cancelled);
    }

    if request.is_vision() && !provider.supports_multimodal() {
        return Err(LlmError::InvalidRequest {
            message: format!(
                "{} model {} does not accept images",
                provider.name(),
                provider.model()
            ),
        });
    }

    let message = request.to_message();
    let system = if request.system_prompt.is_empty() {
        None
    } else {
        Some(request.system_prompt.clone())
    };

    debug!(
        provider = provider.name(),
        model = provider.model(),
        images = request.images.len(),
        "sending completion request"
    );

    let response = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(LlmError::Cancelled),
        result = provider.send_message(vec![message], system, request.options.clone()) => result?,
    };

    // The call may have resolved in the same instant the token fired
    if token.is_cancelled() {
        return Err(LlmError::Cancelled);
    }

    response
        .text()
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError {
            message: format!("{} returned an empty response", provider.name()),
        })
}
