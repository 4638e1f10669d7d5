use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

pub use crate::domain::services::attendance_validation::AttendanceSubmission;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManagementRequest {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub num_coaches: Option<i64>,
    pub num_students: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCoachRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCoachRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    pub batch: Option<String>,
    pub subject: Option<String>,
    pub coach_id: Option<String>,
    pub schedule: Option<String>,
}

/// An empty `coachId` unassigns the coach.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub batch: Option<String>,
    pub subject: Option<String>,
    pub coach_id: Option<String>,
    pub schedule: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: String,
    pub class_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub batch: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub class_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub batch: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub class_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarkRequest {
    pub student_id: String,
    pub subject: String,
    pub exam_name: String,
    pub score: f64,
    pub max_score: f64,
    pub exam_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarkRequest {
    pub subject: Option<String>,
    pub exam_name: Option<String>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
    pub exam_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksQuery {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub class_id: String,
    pub date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceHistoryQuery {
    pub class_id: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub class_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    /// Base64, standard alphabet.
    pub data: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub context: Option<Value>,
}
