use serde_json::Value;
use shared::{ChatMessage, ChatReply, ChatRole};
use thiserror::Error;

use crate::AppState;

const SYSTEM_PROMPT: &str = r#"
You are Claude, an AI assistant specialized in fishing and lure design. You're integrated into a 3D lure visualization application.

Your expertise includes:
- Fishing lure design and engineering
- Color schemes and patterns for different fishing conditions
- Fishing techniques and strategies
- Fish behavior and habitat preferences
- Water conditions and environmental factors
- Lure physics and hydrodynamics

When users ask about their lure, provide helpful, practical advice about fishing techniques, color effectiveness, target fish species, and optimal conditions for use. Be conversational but knowledgeable, and always relate your advice back to practical fishing applications.
"#;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

/// Longest accepted message, counted in UTF-16 code units like the frontend does
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("ANTHROPIC_API_KEY not set")]
    MissingApiKey,

    #[error("request to Anthropic failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Anthropic returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Anthropic reply contained no text")]
    EmptyReply,
}

/// Checks the raw request body and extracts the conversation.
///
/// Errors are client-facing messages.
pub fn parse_conversation(body: &Value) -> Result<Vec<ChatMessage>, String> {
    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| "Messages array is required".to_string())?;

    messages
        .iter()
        .enumerate()
        .map(|(index, message)| parse_message(index, message))
        .collect()
}

fn parse_message(index: usize, message: &Value) -> Result<ChatMessage, String> {
    let role = message.get("role").filter(|v| !is_blank(v));
    let content = message.get("content").filter(|v| !is_blank(v));
    let (Some(role), Some(content)) = (role, content) else {
        return Err(format!("Message at index {index} must have role and content"));
    };

    let content = content
        .as_str()
        .ok_or_else(|| format!("Message content at index {index} must be a string"))?;
    if content.encode_utf16().count() > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message content at index {index} must be under {MAX_MESSAGE_CHARS} characters"
        ));
    }

    let role = role
        .as_str()
        .and_then(ChatRole::parse)
        .ok_or_else(|| format!("Message at index {index} has unsupported role"))?;

    Ok(ChatMessage {
        role,
        content: content.to_string(),
    })
}

/// Null, false, zero and empty strings count as missing
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub async fn process_chat(
    state: &AppState,
    messages: &[ChatMessage],
) -> Result<ChatReply, AssistantError> {
    let api_key = state
        .config
        .anthropic_api_key
        .as_ref()
        .ok_or(AssistantError::MissingApiKey)?;

    let model = state.config.chat_model.clone();
    let url = format!("{}/v1/messages", state.config.anthropic_base_url);

    tracing::debug!(model = %model, turns = messages.len(), "Sending conversation to Anthropic");

    let response = state
        .http
        .post(&url)
        .timeout(state.config.chat_timeout)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT.trim(),
            "messages": messages,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AssistantError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response.json().await?;
    let reply = extract_text(&body).ok_or(AssistantError::EmptyReply)?;

    Ok(ChatReply {
        id: uuid::Uuid::new_v4().to_string(),
        model,
        reply,
    })
}

/// Concatenates the text blocks of a Messages API response
fn extract_text(body: &Value) -> Option<String> {
    let text: String = body["content"]
        .as_array()?
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
