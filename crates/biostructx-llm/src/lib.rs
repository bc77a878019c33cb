//! biostructx-llm — chat-completion backends and the protein chat assistant.

pub mod backend;
pub mod chat;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, OpenAiCompatibleBackend};
pub use chat::{ChatAssistant, ChatOptions, ChatReply, SYSTEM_PROMPT};
