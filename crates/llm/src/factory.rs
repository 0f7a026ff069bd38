//! Provider Factory
//!
//! Maps a `ProviderType` to its concrete provider implementation.

use std::sync::Arc;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::openai::OpenAIProvider;
use crate::provider::LlmProvider;
use crate::types::{LlmResult, ProviderConfig, ProviderType};

/// Create an LLM provider from a ProviderConfig.
pub fn create_provider(config: ProviderConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderType::Gemini => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(provider)
}
