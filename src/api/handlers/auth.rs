use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::{LoginRequest, RegisterRequest}, responses::{AuthResponse, MessageResponse}};
use crate::api::extractors::session::SessionUser;
use crate::domain::models::session::Session;
use crate::domain::services::session_codec::{self, SESSION_COOKIE, SESSION_MAX_AGE_DAYS};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

pub async fn register(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let registered = state.registration
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    let session = Session::for_user(&registered.user, registered.role);
    set_session_cookie(&cookies, &state, &session)?;

    Ok((StatusCode::CREATED, Json(AuthResponse {
        user: registered.user,
        management: registered.management,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let logged_in = state.registration.login(&payload.email, &payload.password).await?;

    let session = Session::for_user(&logged_in.user, logged_in.role);
    set_session_cookie(&cookies, &state, &session)?;

    Ok(Json(AuthResponse {
        user: logged_in.user,
        management: logged_in.management,
    }))
}

pub async fn logout(cookies: Cookies) -> Result<impl IntoResponse, AppError> {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());
    info!("User logged out");
    Ok(Json(MessageResponse::ok("Logged out")))
}

pub async fn current_session(SessionUser(session): SessionUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(session))
}

fn set_session_cookie(cookies: &Cookies, state: &AppState, session: &Session) -> Result<(), AppError> {
    let token = session_codec::encode(session, &state.config.session_secret)?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(state.config.production);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(SESSION_MAX_AGE_DAYS));
    cookies.add(cookie);
    Ok(())
}
