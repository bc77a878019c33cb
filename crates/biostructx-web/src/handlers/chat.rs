//! Protein chat assistant page and API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Form, Json};
use biostructx_llm::{ChatOptions, ChatReply};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::{Module, RequestContext, Theme};
use crate::error::ApiError;
use crate::handlers::render_page;
use crate::state::{AppState, SharedState};

/// Question plus the chat options as flat fields, so the same shape works
/// for urlencoded forms and JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 { ChatOptions::default().temperature }
fn default_max_tokens()  -> u32 { ChatOptions::default().max_tokens }

impl Default for ChatForm {
    fn default() -> Self {
        Self::new(String::new(), ChatOptions::default())
    }
}

impl ChatForm {
    fn new(question: String, options: ChatOptions) -> Self {
        Self { question, advanced: options.advanced, temperature: options.temperature, max_tokens: options.max_tokens }
    }

    pub fn options(&self) -> ChatOptions {
        ChatOptions { advanced: self.advanced, temperature: self.temperature, max_tokens: self.max_tokens }
    }
}

pub async fn run_chat(state: &AppState, form: &ChatForm) -> Result<ChatReply, ApiError> {
    let assistant = state
        .chat
        .as_ref()
        .map_err(|reason| ApiError::unavailable("chat_unavailable", reason.clone()))?;
    Ok(assistant.ask(&form.question, &form.options()).await?)
}

#[derive(Debug, Serialize)]
struct ChatPage<'a> {
    enabled: bool,
    disabled_reason: Option<&'a str>,
    form: ChatForm,
    reply: Option<ChatReply>,
    error: Option<String>,
}

impl<'a> ChatPage<'a> {
    fn new(state: &'a AppState, form: ChatForm) -> Self {
        Self {
            enabled: state.chat.is_ok(),
            disabled_reason: state.chat.as_ref().err().map(String::as_str),
            form,
            reply: None,
            error: None,
        }
    }
}

pub async fn chat_page(State(state): State<SharedState>, theme: Theme) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Chat, theme);
    let status = if state.chat.is_ok() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    render_page(&state, "chat.html", &ctx, status, ChatPage::new(&state, ChatForm::default()))
}

pub async fn chat_submit(
    State(state): State<SharedState>,
    theme: Theme,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let ctx = RequestContext::new(Module::Chat, theme);
    let (reply, error, status) = match run_chat(&state, &form).await {
        Ok(reply) => (Some(reply), None, StatusCode::OK),
        Err(e) => (None, Some(e.message), e.status),
    };
    let shown = ChatForm::new(form.question.clone(), form.options().clamped());
    let mut page = ChatPage::new(&state, shown);
    page.reply = reply;
    page.error = error;
    render_page(&state, "chat.html", &ctx, status, page)
}

/// POST /api/chat
pub async fn api_chat(State(state): State<SharedState>, Json(form): Json<ChatForm>) -> Result<Json<Value>, ApiError> {
    let reply = run_chat(&state, &form).await?;
    Ok(Json(json!({ "status": "success", "reply": reply })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_defaults_match_chat_options() {
        let form: ChatForm = serde_json::from_value(json!({ "question": "What is a kinase?" })).unwrap();
        assert_eq!(form.options(), ChatOptions::default());
    }

    #[test]
    fn test_urlencoded_form() {
        let uri: axum::http::Uri = "/?question=hi&advanced=true&temperature=0.2&max_tokens=300".parse().unwrap();
        let form = axum::extract::Query::<ChatForm>::try_from_uri(&uri).unwrap().0;
        let options = form.options();
        assert!(options.advanced);
        assert_eq!(options.max_tokens, 300);
        assert!((options.temperature - 0.2).abs() < 1e-6);
    }
}
