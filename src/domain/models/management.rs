use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Management {
    pub management_id: String,
    pub name: String,
    pub email_domain: String,
    pub admin_id: Option<String>,
    pub num_coaches: i64,
    pub num_students: i64,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Management {
    pub fn new(email_domain: String) -> Self {
        let name = email_domain
            .split('.')
            .next()
            .filter(|s| !s.is_empty())
            .map(capitalize)
            .unwrap_or_else(|| email_domain.clone());

        Self {
            management_id: generate_management_id(),
            name,
            email_domain,
            admin_id: None,
            num_coaches: 0,
            num_students: 0,
            logo: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementStats {
    pub total_classes: i64,
    pub total_coaches: i64,
    pub total_students: i64,
    pub total_users: i64,
    pub attendance_records_today: i64,
    pub date: String,
}

pub fn generate_management_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("MGT-{}", suffix.to_uppercase())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
