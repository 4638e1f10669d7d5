use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use base64::{Engine as _, engine::general_purpose};
use crate::state::AppState;
use crate::api::dtos::{requests::UploadRequest, responses::UploadResponse};
use crate::api::extractors::session::SessionUser;
use crate::domain::services::authorization::require_staff;
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;
use uuid::Uuid;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        "text/csv" => Some("csv"),
        _ => None,
    }
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&session)?;

    if payload.file_name.trim().is_empty() {
        return Err(AppError::Validation("fileName is required".into()));
    }
    let content_type = payload.content_type.trim().to_lowercase();
    let ext = extension_for(&content_type)
        .ok_or_else(|| AppError::Validation(format!("Unsupported content type: {}", payload.content_type)))?;

    let data = general_purpose::STANDARD
        .decode(payload.data.trim())
        .map_err(|_| AppError::Validation("data must be base64 encoded".into()))?;

    if data.is_empty() {
        return Err(AppError::Validation("File is empty".into()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("File exceeds the 5 MiB limit".into()));
    }

    let key = format!("{}/{}.{}", session.management_id, Uuid::new_v4(), ext);
    let size = data.len();
    let url = state.object_storage.put_object(&key, &content_type, data).await?;

    info!("Uploaded {} ({} bytes) as {}", payload.file_name, size, key);
    Ok((StatusCode::CREATED, Json(UploadResponse { url, key })))
}
