use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub management_id: String,
    pub class_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub batch: Option<String>,
    /// Last status written by a bulk attendance submission.
    pub attendance_status: Option<String>,
    pub attendance_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(management_id: String, class_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            management_id,
            class_id,
            name,
            email: None,
            phone: None,
            roll_number: None,
            batch: None,
            attendance_status: None,
            attendance_updated_at: None,
            created_at: Utc::now(),
        }
    }
}
