//! Google Gemini Provider
//!
//! Implementation of the LlmProvider trait for the Gemini `generateContent` API.
//! The API key travels as a `key` query parameter rather than a header.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, network_error, parse_http_error, LlmProvider};
use super::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageContent, MessageRole,
    ProviderConfig, StopReason, UsageStats,
};

/// Default Gemini API root; the model path is appended per request
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(config.proxy.as_ref())?;
        Ok(Self { config, client })
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/')
    }

    /// Build the full endpoint URL for a model action, with the key attached
    fn endpoint(&self, action: &str, api_key: &str) -> LlmResult<Url> {
        let raw = format!("{}/models/{}:{}", self.base_url(), self.config.model, action);
        let mut url = Url::parse(&raw).map_err(|e| LlmError::InvalidRequest {
            message: format!("invalid Gemini endpoint {}: {}", raw, e),
        })?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        request_options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let contents: Vec<serde_json::Value> =
            messages.iter().map(|m| self.message_to_gemini(m)).collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": request_options
                    .temperature_override
                    .unwrap_or(self.config.temperature),
                "maxOutputTokens": request_options
                    .max_tokens_override
                    .unwrap_or(self.config.max_tokens),
            }
        });

        if let Some(sys) = system.filter(|s| !s.is_empty()) {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": sys }]
            });
        }

        body
    }

    /// Convert a Message to Gemini `contents` format
    fn message_to_gemini(&self, message: &Message) -> serde_json::Value {
        let role = match message.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };

        let parts: Vec<serde_json::Value> = message
            .content
            .iter()
            .map(|c| match c {
                MessageContent::Text { text } => serde_json::json!({ "text": text }),
                MessageContent::Image { media_type, data } => serde_json::json!({
                    "inlineData": {
                        "mimeType": media_type,
                        "data": data
                    }
                }),
            })
            .collect();

        serde_json::json!({
            "role": role,
            "parts": parts
        })
    }

    /// Parse a response from Gemini API
    fn parse_response(&self, response: &GeminiResponse) -> LlmResult<LlmResponse> {
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| LlmError::ParseError {
                message: "Gemini returned no candidates".to_string(),
            })?;

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let stop_reason = candidate
            .finish_reason
            .as_deref()
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage_metadata
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content: if text.is_empty() { None } else { Some(text) },
            stop_reason,
            usage,
            model: response
                .model_version
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("gemini"))?;

        let url = self.endpoint("generateContent", api_key)?;
        let body = self.build_request_body(&messages, system.as_deref(), &request_options);

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(network_error)?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "gemini"));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        self.parse_response(&gemini_response)
    }

    async fn health_check(&self) -> LlmResult<()> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("gemini"))?;

        // Model metadata lookup; cheaper than a generation call
        let raw = format!("{}/models/{}", self.base_url(), self.config.model);
        let mut url = Url::parse(&raw).map_err(|e| LlmError::InvalidRequest {
            message: format!("invalid Gemini endpoint {}: {}", raw, e),
        })?;
        url.query_pairs_mut().append_pair("key", api_key);

        let response = self.client.get(url).send().await.map_err(network_error)?;

        let status = response.status().as_u16();
        if status == 200 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(parse_http_error(status, &body, "gemini"))
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}
