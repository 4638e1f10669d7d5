use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub coach_id: String,
    pub management_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Coach {
    pub fn new(management_id: String, name: String, email: String) -> Self {
        Self {
            coach_id: Uuid::new_v4().to_string(),
            management_id,
            name,
            email: email.to_lowercase(),
            phone: None,
            subject: None,
            created_at: Utc::now(),
        }
    }
}
