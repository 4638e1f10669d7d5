use axum::{body::Bytes, extract::{State, Query}, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::api::dtos::{
    requests::{AttendanceHistoryQuery, AttendanceQuery, AttendanceSubmission, ReconcileRequest},
    responses::BulkAttendanceResponse,
};
use crate::api::extractors::session::{caller_coach, MaybeSession, SessionUser};
use crate::api::handlers::classes::load_visible_class;
use crate::domain::models::{class::ClassRecord, session::Session};
use crate::domain::services::{
    attendance_validation::{validate_batch, verify_enrollment},
    authorization::{can_write_attendance, require_session},
    calendar,
};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

async fn authorize_write(state: &AppState, session: &Session, class: &ClassRecord) -> Result<(), AppError> {
    let caller_coach = caller_coach(state, session).await?;
    can_write_attendance(Some(session), class, caller_coach.as_ref()).into_result()
}

/// `POST /attendance/bulk`. Every check runs before the first write.
pub async fn bulk_upsert(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let session = require_session(session)?;

    let submission: AttendanceSubmission = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?;
    let batch = validate_batch(submission)?;

    let class = state.class_repo.find_by_id(&session.management_id, &batch.class_id).await?
        .ok_or(AppError::NotFound("Class not found".into()))?;

    authorize_write(&state, &session, &class).await?;

    let requested = batch.student_ids();
    let resolved = state.student_repo
        .find_ids_in_class(&session.management_id, &class.class_id, &requested)
        .await?;
    verify_enrollment(&requested, &resolved)?;

    let outcome = state.attendance_engine
        .apply(&session.management_id, &class, &batch, Utc::now())
        .await?;

    info!("Bulk attendance saved for class {} on {} by {}", class.class_id, outcome.record.date, session.user_id);

    Ok(Json(BulkAttendanceResponse {
        success: true,
        message: outcome.message(),
        date: outcome.record.date.clone(),
        day: outcome.record.day.clone(),
        students_updated: outcome.students_updated,
        cache_failures: outcome.cache_failures,
    }))
}

pub async fn get_attendance(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<AttendanceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let class = load_visible_class(&state, &user, &query.class_id).await?;
    let date = calendar::resolve_date(query.date.as_deref(), Utc::now())?;

    let record = state.attendance_repo
        .find_by_class_and_date(&user.0.management_id, &class.class_id, &date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No attendance recorded for this class on {}", date)))?;

    Ok(Json(record))
}

pub async fn attendance_history(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Query(query): Query<AttendanceHistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let class = load_visible_class(&state, &user, &query.class_id).await?;

    let normalize = |raw: Option<String>| -> Result<Option<String>, AppError> {
        raw.filter(|d| !d.trim().is_empty())
            .map(|d| calendar::parse_date(&d).map(|date| date.format(calendar::DATE_FORMAT).to_string()))
            .transpose()
    };
    let from = normalize(query.from)?;
    let to = normalize(query.to)?;

    if let (Some(from), Some(to)) = (&from, &to)
        && from > to
    {
        return Err(AppError::Validation("from must not be after to".into()));
    }

    let records = state.attendance_repo
        .list_by_class(&user.0.management_id, &class.class_id, from.as_deref(), to.as_deref())
        .await?;
    Ok(Json(records))
}

/// Repairs student status caches from the class's most recent record.
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<ReconcileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let class = state.class_repo.find_by_id(&session.management_id, &payload.class_id).await?
        .ok_or(AppError::NotFound("Class not found".into()))?;

    authorize_write(&state, &session, &class).await?;

    let outcome = state.attendance_engine.reconcile_class(&session.management_id, &class.class_id).await?;
    Ok(Json(outcome))
}
