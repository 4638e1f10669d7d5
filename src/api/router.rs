use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{ai, attendance, auth, classes, coaches, health, management, marks, students, upload, users};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

// Base64 inflates the 5 MiB upload cap by a third.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::current_session))

        // Management
        .route("/management", get(management::get_management).put(management::update_management))
        .route("/management/stats", get(management::get_stats))

        // Users
        .route("/users", get(users::get_profile).put(users::update_profile))
        .route("/users/all", get(users::list_users))

        // Coaches & Classes
        .route("/coaches", get(coaches::list_coaches).post(coaches::create_coach))
        .route("/coaches/{id}", get(coaches::get_coach).put(coaches::update_coach).delete(coaches::delete_coach))
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route("/classes/{id}", get(classes::get_class).put(classes::update_class).delete(classes::delete_class))

        // Students & Marks
        .route("/students", get(students::list_students).post(students::create_student))
        .route("/students/{id}", get(students::get_student).put(students::update_student).delete(students::delete_student))
        .route("/marks", get(marks::list_marks).post(marks::create_mark))
        .route("/marks/{id}", axum::routing::put(marks::update_mark).delete(marks::delete_mark))

        // Attendance
        .route("/attendance", get(attendance::get_attendance))
        .route("/attendance/bulk", post(attendance::bulk_upsert))
        .route("/attendance/history", get(attendance::attendance_history))
        .route("/attendance/reconcile", post(attendance::reconcile))

        // Upload & AI
        .route("/upload", post(upload::upload_file))
        .route("/ai/chat", post(ai::chat))

        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        management_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
