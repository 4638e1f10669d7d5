use serde::Serialize;
use crate::domain::models::{management::Management, user::User};

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub management: Management,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceResponse {
    pub success: bool,
    pub message: String,
    pub date: String,
    pub day: String,
    pub students_updated: usize,
    pub cache_failures: Vec<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}
