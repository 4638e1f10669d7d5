use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::UpdateUserRequest;
use crate::api::extractors::session::SessionUser;
use crate::domain::services::{authorization::require_admin, registration};
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&session.management_id, &session.user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = state.user_repo.find_by_id(&session.management_id, &session.user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    if let Some(name) = payload.name.map(|n| n.trim().to_string()) {
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        user.name = name;
    }

    match (payload.current_password, payload.new_password) {
        (Some(current), Some(new)) => {
            registration::verify_password(&current, &user.password_hash)
                .map_err(|_| AppError::Validation("Current password is incorrect".into()))?;
            registration::check_password_strength(&new)?;
            user.password_hash = registration::hash_password(&new)?;
            info!("Password changed for user {}", user.id);
        }
        (None, None) => {}
        _ => return Err(AppError::Validation("Both currentPassword and newPassword are required".into())),
    }

    let updated = state.user_repo.update(&user).await?;
    Ok(Json(updated))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&session)?;
    let users = state.user_repo.list_by_management(&session.management_id).await?;
    Ok(Json(users))
}
