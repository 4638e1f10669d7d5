use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::{requests::{CreateStudentRequest, StudentQuery, UpdateStudentRequest}, responses::MessageResponse};
use crate::api::extractors::session::SessionUser;
use crate::api::handlers::classes::{load_visible_class, visible_classes};
use crate::domain::models::{student::Student, user::Role};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

async fn load_student(state: &AppState, user: &SessionUser, id: &str) -> Result<Student, AppError> {
    let student = state.student_repo.find_by_id(&user.0.management_id, id).await?
        .ok_or(AppError::NotFound("Student not found".into()))?;
    load_visible_class(state, user, &student.class_id).await?;
    Ok(student)
}

pub async fn list_students(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let management_id = user.0.management_id.clone();

    if let Some(class_id) = query.class_id.filter(|c| !c.is_empty()) {
        load_visible_class(&state, &user, &class_id).await?;
        return Ok(Json(state.student_repo.list(&management_id, Some(&class_id)).await?));
    }

    if user.0.role == Role::Admin {
        return Ok(Json(state.student_repo.list(&management_id, None).await?));
    }

    let mut students = Vec::new();
    for class in visible_classes(&state, &user).await? {
        students.extend(state.student_repo.list(&management_id, Some(&class.class_id)).await?);
    }
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_student(&state, &user, &id).await?))
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Student name is required".into()));
    }
    let class = load_visible_class(&state, &user, &payload.class_id).await?;

    let mut student = Student::new(user.0.management_id.clone(), class.class_id, name);
    student.email = payload.email.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty());
    student.phone = payload.phone;
    student.roll_number = payload.roll_number;
    student.batch = payload.batch.or(class.batch);

    let created = state.student_repo.create(&student).await?;
    info!("Student created: {} in class {}", created.id, created.class_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_student(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut student = load_student(&state, &user, &id).await?;

    if let Some(class_id) = payload.class_id.filter(|c| *c != student.class_id) {
        let target = load_visible_class(&state, &user, &class_id).await?;
        student.class_id = target.class_id;
    }
    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("Student name is required".into()));
        }
        student.name = name;
    }
    if let Some(email) = payload.email {
        student.email = Some(email.trim().to_lowercase()).filter(|e| !e.is_empty());
    }
    if payload.phone.is_some() {
        student.phone = payload.phone;
    }
    if payload.roll_number.is_some() {
        student.roll_number = payload.roll_number;
    }
    if payload.batch.is_some() {
        student.batch = payload.batch;
    }

    let updated = state.student_repo.update(&student).await?;
    info!("Student updated: {}", id);
    Ok(Json(updated))
}

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_student(&state, &user, &id).await?;
    state.student_repo.delete(&user.0.management_id, &id).await?;
    info!("Student deleted: {}", id);
    Ok(Json(MessageResponse::ok("Student deleted")))
}
