//! Interview Assist LLM
//!
//! Provides a unified interface for the vision-capable LLM providers used by
//! the assistant:
//! - OpenAI (chat completions)
//! - Anthropic Claude (messages)
//! - Google Gemini (generateContent)
//!
//! Also includes the HTTP client factory, the provider factory and the
//! cancellable completion capability the solution pipeline is built on.

pub mod anthropic;
pub mod completion;
pub mod factory;
pub mod gemini;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use completion::{complete_with_cancellation, CompletionClient, CompletionRequest};
pub use factory::create_provider;
pub use gemini::GeminiProvider;
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
