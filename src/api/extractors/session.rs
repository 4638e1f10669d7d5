use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::{coach::Coach, session::Session, user::Role};
use crate::domain::services::session_codec::{self, SESSION_COOKIE};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, Span};

fn session_from_parts(parts: &Parts, app_state: &AppState) -> Option<Session> {
    let cookies = parts.extensions.get::<Cookies>()?;
    let cookie = cookies.get(SESSION_COOKIE)?;

    let session = session_codec::decode(Some(cookie.value()), &app_state.config.session_secret);
    match &session {
        Some(s) => {
            Span::current().record("management_id", s.management_id.as_str());
            Span::current().record("user_id", s.user_id.as_str());
        }
        None => debug!("Ignoring session cookie that failed verification"),
    }
    session
}

/// A verified session; rejects with 401 otherwise.
pub struct SessionUser(pub Session);

/// The coach record behind a coach-role session. Other roles never act as a coach, even when
/// a coach record with their email exists.
pub async fn caller_coach(state: &AppState, session: &Session) -> Result<Option<Coach>, AppError> {
    if session.role != Role::Coach {
        return Ok(None);
    }
    state.coach_repo.find_by_email(&session.management_id, &session.email).await
}

impl SessionUser {
    pub async fn caller_coach(&self, state: &AppState) -> Result<Option<Coach>, AppError> {
        caller_coach(state, &self.0).await
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        session_from_parts(parts, &app_state)
            .map(SessionUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Never rejects; a missing or forged cookie yields `None`.
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        Ok(MaybeSession(session_from_parts(parts, &app_state)))
    }
}
