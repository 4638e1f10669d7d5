use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::api::dtos::requests::UpdateManagementRequest;
use crate::api::extractors::session::SessionUser;
use crate::domain::services::{authorization::{require_admin, require_staff}, calendar};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

pub async fn get_management(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let management = state.management_repo.find_by_id(&session.management_id).await?
        .ok_or(AppError::NotFound("Management not found".into()))?;
    Ok(Json(management))
}

pub async fn update_management(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<UpdateManagementRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let mut management = state.management_repo.find_by_id(&session.management_id).await?
        .ok_or(AppError::NotFound("Management not found".into()))?;

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        management.name = name;
    }
    if let Some(logo) = payload.logo {
        management.logo = Some(logo).filter(|l| !l.is_empty());
    }
    for count in [payload.num_coaches, payload.num_students].into_iter().flatten() {
        if count < 0 {
            return Err(AppError::Validation("Counts cannot be negative".into()));
        }
    }
    if let Some(n) = payload.num_coaches {
        management.num_coaches = n;
    }
    if let Some(n) = payload.num_students {
        management.num_students = n;
    }

    let updated = state.management_repo.update(&management).await?;
    info!("Management updated: {}", updated.management_id);
    Ok(Json(updated))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&session)?;

    let today = calendar::kolkata_today(Utc::now()).format(calendar::DATE_FORMAT).to_string();
    let stats = state.management_repo.stats(&session.management_id, &today).await?;
    Ok(Json(stats))
}
