use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::{requests::{CreateMarkRequest, MarksQuery, UpdateMarkRequest}, responses::MessageResponse};
use crate::api::extractors::session::SessionUser;
use crate::api::handlers::classes::{load_visible_class, visible_classes};
use crate::domain::models::{marks::MarkEntry, user::Role};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

fn check_scores(score: f64, max_score: f64) -> Result<(), AppError> {
    if !score.is_finite() || !max_score.is_finite() || max_score <= 0.0 {
        return Err(AppError::Validation("maxScore must be greater than zero".into()));
    }
    if score < 0.0 || score > max_score {
        return Err(AppError::Validation("score must be between 0 and maxScore".into()));
    }
    Ok(())
}

async fn load_mark(state: &AppState, user: &SessionUser, id: &str) -> Result<MarkEntry, AppError> {
    let entry = state.marks_repo.find_by_id(&user.0.management_id, id).await?
        .ok_or(AppError::NotFound("Mark entry not found".into()))?;
    load_visible_class(state, user, &entry.class_id).await?;
    Ok(entry)
}

pub async fn list_marks(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<MarksQuery>,
) -> Result<impl IntoResponse, AppError> {
    let management_id = user.0.management_id.clone();
    let student_id = query.student_id.filter(|s| !s.is_empty());
    let class_id = query.class_id.filter(|c| !c.is_empty());

    if let Some(student_id) = &student_id {
        let student = state.student_repo.find_by_id(&management_id, student_id).await?
            .ok_or(AppError::NotFound("Student not found".into()))?;
        load_visible_class(&state, &user, &student.class_id).await?;
    }
    if let Some(class_id) = &class_id {
        load_visible_class(&state, &user, class_id).await?;
    }

    if student_id.is_some() || class_id.is_some() || user.0.role == Role::Admin {
        let marks = state.marks_repo.list(&management_id, student_id.as_deref(), class_id.as_deref()).await?;
        return Ok(Json(marks));
    }

    let mut marks = Vec::new();
    for class in visible_classes(&state, &user).await? {
        marks.extend(state.marks_repo.list(&management_id, None, Some(&class.class_id)).await?);
    }
    Ok(Json(marks))
}

pub async fn create_mark(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Json(payload): Json<CreateMarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_scores(payload.score, payload.max_score)?;

    let subject = payload.subject.trim().to_string();
    let exam_name = payload.exam_name.trim().to_string();
    if subject.is_empty() || exam_name.is_empty() {
        return Err(AppError::Validation("subject and examName are required".into()));
    }

    let student = state.student_repo.find_by_id(&user.0.management_id, &payload.student_id).await?
        .ok_or(AppError::NotFound("Student not found".into()))?;
    load_visible_class(&state, &user, &student.class_id).await?;

    let mut entry = MarkEntry::new(
        user.0.management_id.clone(),
        student.id,
        student.class_id,
        subject,
        exam_name,
        payload.score,
        payload.max_score,
    );
    entry.exam_date = payload.exam_date;

    let created = state.marks_repo.create(&entry).await?;
    info!("Mark entry created: {} for student {}", created.id, created.student_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_mark(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut entry = load_mark(&state, &user, &id).await?;

    if let Some(subject) = payload.subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        entry.subject = subject;
    }
    if let Some(exam_name) = payload.exam_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        entry.exam_name = exam_name;
    }
    if let Some(score) = payload.score {
        entry.score = score;
    }
    if let Some(max_score) = payload.max_score {
        entry.max_score = max_score;
    }
    if payload.exam_date.is_some() {
        entry.exam_date = payload.exam_date;
    }
    check_scores(entry.score, entry.max_score)?;

    let updated = state.marks_repo.update(&entry).await?;
    info!("Mark entry updated: {}", id);
    Ok(Json(updated))
}

pub async fn delete_mark(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_mark(&state, &user, &id).await?;
    state.marks_repo.delete(&user.0.management_id, &id).await?;
    info!("Mark entry deleted: {}", id);
    Ok(Json(MessageResponse::ok("Mark entry deleted")))
}
