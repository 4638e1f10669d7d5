use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    ApprovedLeave,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::ApprovedLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::ApprovedLeave => "approved_leave",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or(())
    }
}

/// One document per (class, date) within a management.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub management_id: String,
    pub class_id: String,
    pub coach_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: String,
    pub students: BTreeMap<String, AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_reasons: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        management_id: String,
        class_id: String,
        coach_id: Option<String>,
        date: String,
        day: String,
        students: BTreeMap<String, AttendanceStatus>,
        leave_reasons: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            management_id,
            class_id,
            coach_id,
            date,
            day,
            students,
            leave_reasons: if leave_reasons.is_empty() { None } else { Some(leave_reasons) },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn students_json(&self) -> Result<String, AppError> {
        serde_json::to_string(&self.students)
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to encode students map: {}", e)))
    }

    pub fn leave_reasons_json(&self) -> Result<Option<String>, AppError> {
        self.leave_reasons
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to encode leave reasons: {}", e)))
    }
}

/// Storage shape: both maps are kept as JSON text columns.
#[derive(Debug, FromRow)]
pub struct AttendanceRow {
    pub id: String,
    pub management_id: String,
    pub class_id: String,
    pub coach_id: Option<String>,
    pub date: String,
    pub day: String,
    pub students: String,
    pub leave_reasons: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let students = serde_json::from_str(&row.students)
            .map_err(|e| AppError::InternalWithMsg(format!("Corrupt students map on {}: {}", row.id, e)))?;

        let leave_reasons = match row.leave_reasons {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| AppError::InternalWithMsg(format!("Corrupt leave reasons on {}: {}", row.id, e)))?,
            ),
            None => None,
        };

        Ok(Self {
            id: row.id,
            management_id: row.management_id,
            class_id: row.class_id,
            coach_id: row.coach_id,
            date: row.date,
            day: row.day,
            students,
            leave_reasons,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
