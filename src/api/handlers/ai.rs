use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::ChatRequest;
use crate::api::extractors::session::SessionUser;
use crate::error::AppError;
use std::sync::Arc;
use serde_json::{json, Value};
use tracing::info;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt is required".into()));
    }

    let request = json!({
        "prompt": prompt,
        "context": payload.context.unwrap_or(Value::Null),
        "managementId": session.management_id,
        "role": session.role,
    });

    info!("AI chat request from {}", session.user_id);
    let reply = state.ai_backend.chat(&request).await?;
    Ok(Json(reply))
}
