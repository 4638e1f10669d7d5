use crate::domain::models::{
    management::{Management, ManagementStats}, user::User, coach::Coach, class::ClassRecord,
    student::Student, attendance::AttendanceRecord, marks::MarkEntry,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait ManagementRepository: Send + Sync {
    /// Inserts the management with `admin` as its admin user in one transaction; nothing is
    /// written when either insert fails. Fails with a unique violation when the email domain
    /// or the admin's email is already taken.
    async fn create_with_admin(&self, management: &Management, admin: &User) -> Result<(Management, User), AppError>;
    async fn find_by_id(&self, management_id: &str) -> Result<Option<Management>, AppError>;
    async fn find_by_domain(&self, email_domain: &str) -> Result<Option<Management>, AppError>;
    async fn update(&self, management: &Management) -> Result<Management, AppError>;
    async fn stats(&self, management_id: &str, today: &str) -> Result<ManagementStats, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, management_id: &str, id: &str) -> Result<Option<User>, AppError>;
    async fn list_by_management(&self, management_id: &str) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

#[async_trait]
pub trait CoachRepository: Send + Sync {
    async fn create(&self, coach: &Coach) -> Result<Coach, AppError>;
    async fn find_by_id(&self, management_id: &str, coach_id: &str) -> Result<Option<Coach>, AppError>;
    async fn find_by_email(&self, management_id: &str, email: &str) -> Result<Option<Coach>, AppError>;
    async fn list(&self, management_id: &str) -> Result<Vec<Coach>, AppError>;
    async fn update(&self, coach: &Coach) -> Result<Coach, AppError>;
    /// Also clears the coach from every class it was assigned to.
    async fn delete(&self, management_id: &str, coach_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn create(&self, class: &ClassRecord) -> Result<ClassRecord, AppError>;
    async fn find_by_id(&self, management_id: &str, class_id: &str) -> Result<Option<ClassRecord>, AppError>;
    async fn list(&self, management_id: &str) -> Result<Vec<ClassRecord>, AppError>;
    async fn list_by_coach(&self, management_id: &str, coach_id: &str) -> Result<Vec<ClassRecord>, AppError>;
    async fn update(&self, class: &ClassRecord) -> Result<ClassRecord, AppError>;
    async fn delete(&self, management_id: &str, class_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn create(&self, student: &Student) -> Result<Student, AppError>;
    async fn find_by_id(&self, management_id: &str, id: &str) -> Result<Option<Student>, AppError>;
    async fn list(&self, management_id: &str, class_id: Option<&str>) -> Result<Vec<Student>, AppError>;
    /// Returns the subset of `ids` enrolled in the class under the management.
    async fn find_ids_in_class(&self, management_id: &str, class_id: &str, ids: &[String]) -> Result<Vec<String>, AppError>;
    async fn count_in_class(&self, management_id: &str, class_id: &str) -> Result<i64, AppError>;
    async fn update(&self, student: &Student) -> Result<Student, AppError>;
    async fn delete(&self, management_id: &str, id: &str) -> Result<(), AppError>;
    /// `Ok(false)` when no student row matched.
    async fn update_attendance_status(
        &self,
        management_id: &str,
        id: &str,
        status: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Keyed by (class_id, date, management_id). Replaces `students` and `leave_reasons`,
    /// keeps the stored `created_at`.
    async fn upsert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, AppError>;
    async fn find_by_class_and_date(&self, management_id: &str, class_id: &str, date: &str) -> Result<Option<AttendanceRecord>, AppError>;
    async fn list_by_class(&self, management_id: &str, class_id: &str, from: Option<&str>, to: Option<&str>) -> Result<Vec<AttendanceRecord>, AppError>;
}

#[async_trait]
pub trait MarksRepository: Send + Sync {
    async fn create(&self, entry: &MarkEntry) -> Result<MarkEntry, AppError>;
    async fn find_by_id(&self, management_id: &str, id: &str) -> Result<Option<MarkEntry>, AppError>;
    async fn list(&self, management_id: &str, student_id: Option<&str>, class_id: Option<&str>) -> Result<Vec<MarkEntry>, AppError>;
    async fn update(&self, entry: &MarkEntry) -> Result<MarkEntry, AppError>;
    async fn delete(&self, management_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AiBackend: Send + Sync {
    async fn chat(&self, payload: &Value) -> Result<Value, AppError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the bytes under `key` and returns the public URL.
    async fn put_object(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, AppError>;
}
