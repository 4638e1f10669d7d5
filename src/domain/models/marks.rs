use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    pub id: String,
    pub management_id: String,
    pub student_id: String,
    pub class_id: String,
    pub subject: String,
    pub exam_name: String,
    pub score: f64,
    pub max_score: f64,
    pub exam_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl MarkEntry {
    pub fn new(
        management_id: String,
        student_id: String,
        class_id: String,
        subject: String,
        exam_name: String,
        score: f64,
        max_score: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            management_id,
            student_id,
            class_id,
            subject,
            exam_name,
            score,
            max_score,
            exam_date: None,
            created_at: Utc::now(),
        }
    }
}
