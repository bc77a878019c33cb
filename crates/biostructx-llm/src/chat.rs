//! Protein chat assistant: a fixed system prompt plus one user question.

use std::sync::Arc;

use biostructx_common::config::ChatConfig;
use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::{LlmBackend, LlmError, LlmRequest, Message, OpenAiCompatibleBackend};

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant specialized in protein bioinformatics and drug discovery.";

pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Use the advanced model (GPT-4) instead of the default one.
    #[serde(default)]
    pub advanced: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens()  -> u32 { 512 }

impl Default for ChatOptions {
    fn default() -> Self {
        Self { advanced: false, temperature: default_temperature(), max_tokens: default_max_tokens() }
    }
}

impl ChatOptions {
    /// Temperature in 0.0..=1.0 (NaN becomes the default), max tokens in 100..=2048.
    pub fn clamped(self) -> Self {
        let temperature = if self.temperature.is_nan() {
            default_temperature()
        } else {
            self.temperature.clamp(0.0, 1.0)
        };
        Self {
            advanced: self.advanced,
            temperature,
            max_tokens: self.max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

pub struct ChatAssistant {
    backend: Arc<dyn LlmBackend>,
    default_model: String,
    advanced_model: String,
}

impl ChatAssistant {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        default_model: impl Into<String>,
        advanced_model: impl Into<String>,
    ) -> Self {
        Self { backend, default_model: default_model.into(), advanced_model: advanced_model.into() }
    }

    /// Builds the assistant from `[chat]`. Without an API key the assistant
    /// is `Unavailable` and the caller disables the chat page.
    pub fn from_config(config: &ChatConfig, http: HttpClient) -> Result<Self, LlmError> {
        let key = config.api_key().ok_or_else(|| {
            LlmError::Unavailable(format!("{} is not set; the chat assistant is disabled", config.api_key_env))
        })?;
        let backend = OpenAiCompatibleBackend::new(http, &config.base_url, &config.default_model, Some(key));
        Ok(Self::new(Arc::new(backend), &config.default_model, &config.advanced_model))
    }

    pub fn model_for(&self, options: &ChatOptions) -> &str {
        if options.advanced { &self.advanced_model } else { &self.default_model }
    }

    pub async fn ask(&self, question: &str, options: &ChatOptions) -> Result<ChatReply, LlmError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(LlmError::InvalidRequest("question is empty".to_string()));
        }
        let options = options.clamped();
        let model = self.model_for(&options).to_string();

        let request = LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(question)],
            model: Some(model.clone()),
            max_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
        };
        info!(model = %model, temperature = options.temperature, max_tokens = options.max_tokens, "Chat request");

        let response = self.backend.complete(request).await?;
        Ok(ChatReply {
            answer: response.content,
            model: response.model,
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
        })
    }
}
