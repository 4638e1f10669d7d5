use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::{requests::{CreateClassRequest, UpdateClassRequest}, responses::MessageResponse};
use crate::api::extractors::session::SessionUser;
use crate::domain::models::{class::ClassRecord, user::Role};
use crate::domain::services::authorization::{can_view_class, require_admin, require_staff};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

/// Staff-only lookup of a class the caller may read; coaches only reach their own classes.
pub(crate) async fn load_visible_class(
    state: &AppState,
    user: &SessionUser,
    class_id: &str,
) -> Result<ClassRecord, AppError> {
    require_staff(&user.0)?;

    let class = state.class_repo.find_by_id(&user.0.management_id, class_id).await?
        .ok_or(AppError::NotFound("Class not found".into()))?;

    let caller_coach = user.caller_coach(state).await?;
    if !can_view_class(&user.0, &class, caller_coach.as_ref()) {
        return Err(AppError::Forbidden("You are not the assigned coach for this class.".into()));
    }
    Ok(class)
}

/// Classes the caller may read: all of them for admins, assigned ones for coaches.
pub(crate) async fn visible_classes(state: &AppState, user: &SessionUser) -> Result<Vec<ClassRecord>, AppError> {
    require_staff(&user.0)?;

    if user.0.role == Role::Admin {
        return state.class_repo.list(&user.0.management_id).await;
    }
    match user.caller_coach(state).await? {
        Some(coach) => state.class_repo.list_by_coach(&user.0.management_id, &coach.coach_id).await,
        None => Ok(Vec::new()),
    }
}

async fn check_coach_exists(state: &AppState, management_id: &str, coach_id: &str) -> Result<(), AppError> {
    if state.coach_repo.find_by_id(management_id, coach_id).await?.is_none() {
        return Err(AppError::Validation(format!("Coach {} does not exist", coach_id)));
    }
    Ok(())
}

pub async fn list_classes(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(visible_classes(&state, &user).await?))
}

pub async fn get_class(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(class_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_visible_class(&state, &user, &class_id).await?))
}

pub async fn create_class(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Class name is required".into()));
    }

    let coach_id = payload.coach_id.filter(|c| !c.trim().is_empty());
    if let Some(coach_id) = &coach_id {
        check_coach_exists(&state, &session.management_id, coach_id).await?;
    }

    let mut class = ClassRecord::new(session.management_id.clone(), name);
    class.batch = payload.batch;
    class.subject = payload.subject;
    class.coach_id = coach_id;
    class.schedule = payload.schedule;

    let created = state.class_repo.create(&class).await?;
    info!("Class created: {}", created.class_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_class(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Path(class_id): Path<String>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let mut class = state.class_repo.find_by_id(&session.management_id, &class_id).await?
        .ok_or(AppError::NotFound("Class not found".into()))?;

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("Class name is required".into()));
        }
        class.name = name;
    }
    if let Some(coach_id) = payload.coach_id.map(|c| c.trim().to_string()) {
        if coach_id.is_empty() {
            class.coach_id = None;
        } else {
            check_coach_exists(&state, &session.management_id, &coach_id).await?;
            class.coach_id = Some(coach_id);
        }
    }
    if payload.batch.is_some() {
        class.batch = payload.batch;
    }
    if payload.subject.is_some() {
        class.subject = payload.subject;
    }
    if payload.schedule.is_some() {
        class.schedule = payload.schedule;
    }

    let updated = state.class_repo.update(&class).await?;
    info!("Class updated: {}", class_id);
    Ok(Json(updated))
}

pub async fn delete_class(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Path(class_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;

    let enrolled = state.student_repo.count_in_class(&session.management_id, &class_id).await?;
    if enrolled > 0 {
        return Err(AppError::Conflict(format!("Class still has {} enrolled students", enrolled)));
    }

    state.class_repo.delete(&session.management_id, &class_id).await?;
    info!("Class deleted: {}", class_id);
    Ok(Json(MessageResponse::ok("Class deleted")))
}
