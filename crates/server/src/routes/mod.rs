use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde_json::Value;

use crate::ai;
use crate::error::AppError;
use crate::AppState;
use shared::{ChatReply, HealthResponse, LureCatalog, MessageResponse, PatternCatalog};

pub const ROOT_MESSAGE: &str = "AI Lure Designer API is running! 🎣";
pub const RENDER_NOT_IMPLEMENTED: &str = "Rendering not implemented yet";

/// Service banner
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(ROOT_MESSAGE))
}

/// Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Available lure shapes (stub)
pub async fn list_lures() -> Json<LureCatalog> {
    Json(LureCatalog::default())
}

/// Available texture patterns (stub)
pub async fn list_patterns() -> Json<PatternCatalog> {
    Json(PatternCatalog::default())
}

/// Render a lure with applied texture (stub). The request body is never read.
pub async fn render_lure() -> Json<MessageResponse> {
    Json(MessageResponse::new(RENDER_NOT_IMPLEMENTED))
}

/// Lure design assistant. An unreadable body is answered like any other
/// assistant failure, as JSON.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!("Unreadable chat request: {}", rejection.body_text());
        AppError::Upstream(rejection.body_text())
    })?;

    let messages = ai::parse_conversation(&body).map_err(|msg| {
        tracing::warn!("Rejected chat request: {}", msg);
        AppError::BadRequest(msg)
    })?;

    let reply = ai::process_chat(&state, &messages).await.map_err(|e| match e {
        ai::AssistantError::MissingApiKey => {
            tracing::error!("ANTHROPIC_API_KEY is not set");
            AppError::Configuration
        }
        other => {
            tracing::error!("Chat error: {}", other);
            AppError::Upstream(other.to_string())
        }
    })?;

    tracing::info!(id = %reply.id, turns = messages.len(), "Chat reply produced");
    Ok(Json(reply))
}
