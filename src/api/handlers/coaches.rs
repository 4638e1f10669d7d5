use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::{requests::{CreateCoachRequest, UpdateCoachRequest}, responses::MessageResponse};
use crate::api::extractors::session::SessionUser;
use crate::domain::models::coach::Coach;
use crate::domain::services::{authorization::{require_admin, require_staff}, registration::normalize_email};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

pub async fn list_coaches(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&session)?;
    let coaches = state.coach_repo.list(&session.management_id).await?;
    Ok(Json(coaches))
}

pub async fn get_coach(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Path(coach_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_staff(&session)?;
    let coach = state.coach_repo.find_by_id(&session.management_id, &coach_id).await?
        .ok_or(AppError::NotFound("Coach not found".into()))?;
    Ok(Json(coach))
}

pub async fn create_coach(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<CreateCoachRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Coach name is required".into()));
    }
    let email = normalize_email(&payload.email)?;

    if state.coach_repo.find_by_email(&session.management_id, &email).await?.is_some() {
        return Err(AppError::Conflict("A coach with this email already exists".into()));
    }

    let mut coach = Coach::new(session.management_id.clone(), name, email);
    coach.phone = payload.phone;
    coach.subject = payload.subject;

    let created = state.coach_repo.create(&coach).await?;
    info!("Coach created: {}", created.coach_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_coach(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Path(coach_id): Path<String>,
    Json(payload): Json<UpdateCoachRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let mut coach = state.coach_repo.find_by_id(&session.management_id, &coach_id).await?
        .ok_or(AppError::NotFound("Coach not found".into()))?;

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("Coach name is required".into()));
        }
        coach.name = name;
    }
    if let Some(raw) = payload.email {
        let email = normalize_email(&raw)?;
        if email != coach.email
            && state.coach_repo.find_by_email(&session.management_id, &email).await?.is_some()
        {
            return Err(AppError::Conflict("A coach with this email already exists".into()));
        }
        coach.email = email;
    }
    if payload.phone.is_some() {
        coach.phone = payload.phone;
    }
    if payload.subject.is_some() {
        coach.subject = payload.subject;
    }

    let updated = state.coach_repo.update(&coach).await?;
    info!("Coach updated: {}", coach_id);
    Ok(Json(updated))
}

pub async fn delete_coach(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Path(coach_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;
    state.coach_repo.delete(&session.management_id, &coach_id).await?;
    info!("Coach deleted: {}", coach_id);
    Ok(Json(MessageResponse::ok("Coach deleted")))
}
