use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use crate::domain::models::attendance::AttendanceStatus;
use crate::domain::services::calendar;
use crate::error::AppError;

const MAX_LISTED_IDS: usize = 5;

/// Body of `POST /attendance/bulk` as received. Every field is optional here so that missing
/// fields surface as 400s with a precise message instead of a generic parse failure.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceSubmission {
    pub class_id: Option<String>,
    pub coach_id: Option<String>,
    pub date: Option<String>,
    pub day: Option<String>,
    pub attendance: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SubmittedEntry {
    student_id: String,
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub student_id: String,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceBatch {
    pub class_id: String,
    pub coach_id: Option<String>,
    /// Normalised `YYYY-MM-DD`; `None` means "today in Kolkata".
    pub date: Option<String>,
    pub day: String,
    pub entries: Vec<BatchEntry>,
}

impl AttendanceBatch {
    pub fn student_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.student_id.clone()).collect()
    }
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}

/// Structural checks only; enrollment is verified separately against the store.
pub fn validate_batch(submission: AttendanceSubmission) -> Result<AttendanceBatch, AppError> {
    let class_id = required(submission.class_id, "classId")?;
    let day = required(submission.day, "day")?;

    let date = match submission.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(calendar::parse_date(raw)?.format(calendar::DATE_FORMAT).to_string()),
        None => None,
    };

    let items = match submission.attendance {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(AppError::Validation("attendance must be an array".into())),
        None => return Err(AppError::Validation("attendance is required".into())),
    };

    if items.is_empty() {
        return Err(AppError::Validation("attendance must contain at least one entry".into()));
    }

    let mut seen = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let entry: SubmittedEntry = serde_json::from_value(item)
            .map_err(|e| AppError::Validation(format!("Invalid attendance entry at index {}: {}", index, e)))?;

        let student_id = entry.student_id.trim().to_string();
        if student_id.is_empty() {
            return Err(AppError::Validation(format!("studentId is required at index {}", index)));
        }

        let status: AttendanceStatus = entry.status.parse().map_err(|_| {
            AppError::Validation(format!(
                "Invalid status '{}' for student {}; expected one of present, absent, late, approved_leave",
                entry.status, student_id
            ))
        })?;

        if !seen.insert(student_id.clone()) {
            return Err(AppError::Validation(format!("Duplicate studentId {}", student_id)));
        }

        let reason = entry.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        entries.push(BatchEntry { student_id, status, reason });
    }

    Ok(AttendanceBatch {
        class_id,
        coach_id: submission.coach_id.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        date,
        day,
        entries,
    })
}

/// The IDs resolved under (management, class) must be exactly the requested set.
pub fn verify_enrollment(requested: &[String], resolved: &[String]) -> Result<(), AppError> {
    let resolved: HashSet<&str> = resolved.iter().map(String::as_str).collect();
    let requested_set: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let unknown: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|id| !resolved.contains(id))
        .collect();

    if !unknown.is_empty() {
        let listed = unknown.iter().take(MAX_LISTED_IDS).copied().collect::<Vec<_>>().join(", ");
        let more = unknown.len().saturating_sub(MAX_LISTED_IDS);
        let suffix = if more > 0 { format!(" and {} more", more) } else { String::new() };
        return Err(AppError::Validation(format!(
            "{} student(s) are not enrolled in this class: {}{}",
            unknown.len(), listed, suffix
        )));
    }

    if resolved != requested_set {
        return Err(AppError::Validation("Resolved students do not match the submitted batch".into()));
    }

    Ok(())
}
