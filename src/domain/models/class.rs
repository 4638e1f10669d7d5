use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub class_id: String,
    pub management_id: String,
    pub name: String,
    pub batch: Option<String>,
    pub subject: Option<String>,
    pub coach_id: Option<String>,
    pub schedule: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClassRecord {
    pub fn new(management_id: String, name: String) -> Self {
        Self {
            class_id: Uuid::new_v4().to_string(),
            management_id,
            name,
            batch: None,
            subject: None,
            coach_id: None,
            schedule: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_coach(&self) -> bool {
        self.coach_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}
