use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use crate::domain::models::{attendance::{AttendanceRecord, AttendanceStatus}, class::ClassRecord};
use crate::domain::ports::{AttendanceRepository, StudentRepository};
use crate::domain::services::{attendance_validation::AttendanceBatch, calendar};
use crate::error::AppError;

#[derive(Debug)]
pub struct BulkOutcome {
    pub record: AttendanceRecord,
    pub students_updated: usize,
    /// Student IDs whose cached `attendance_status` could not be written.
    pub cache_failures: Vec<String>,
}

impl BulkOutcome {
    pub fn message(&self) -> String {
        if self.cache_failures.is_empty() {
            "Attendance saved successfully".to_string()
        } else {
            format!(
                "Attendance saved; {} of {} student status caches failed to update",
                self.cache_failures.len(),
                self.record.students.len()
            )
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub class_id: String,
    pub date: String,
    pub students_updated: usize,
    pub cache_failures: Vec<String>,
}

/// Writes the per-class-per-day record, then mirrors each status onto the student rows.
///
/// The record write is authoritative. The mirror is best-effort: failures are reported in the
/// outcome and can be repaired later with [`AttendanceEngine::reconcile_class`].
pub struct AttendanceEngine {
    attendance: Arc<dyn AttendanceRepository>,
    students: Arc<dyn StudentRepository>,
}

impl AttendanceEngine {
    pub fn new(attendance: Arc<dyn AttendanceRepository>, students: Arc<dyn StudentRepository>) -> Self {
        Self { attendance, students }
    }

    #[instrument(skip(self, class, batch), fields(class_id = %class.class_id))]
    pub async fn apply(
        &self,
        management_id: &str,
        class: &ClassRecord,
        batch: &AttendanceBatch,
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome, AppError> {
        let date = calendar::resolve_date(batch.date.as_deref(), now)?;
        let coach_id = recorded_coach(class, batch)?;
        let (students, leave_reasons) = build_maps(batch);

        let record = AttendanceRecord::new(
            management_id.to_string(),
            class.class_id.clone(),
            coach_id,
            date,
            batch.day.clone(),
            students,
            leave_reasons,
            now,
        );

        let saved = self.attendance.upsert(&record).await?;

        let entries = saved.students.iter().map(|(id, status)| (id.clone(), *status, saved.updated_at)).collect();
        let (students_updated, cache_failures) = self.mirror(management_id, entries).await;

        info!(
            "Attendance saved for class {} on {}: {} students, {} cache failures",
            saved.class_id, saved.date, saved.students.len(), cache_failures.len()
        );

        Ok(BulkOutcome { record: saved, students_updated, cache_failures })
    }

    /// Re-derives every student's cached status from the most recently written record that
    /// names the student, the same order in which `apply` mirrors statuses.
    #[instrument(skip(self))]
    pub async fn reconcile_class(&self, management_id: &str, class_id: &str) -> Result<ReconcileOutcome, AppError> {
        let mut records = self.attendance.list_by_class(management_id, class_id, None, None).await?;
        if records.is_empty() {
            return Err(AppError::NotFound("No attendance recorded for this class".into()));
        }
        records.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then_with(|| a.date.cmp(&b.date)));

        let mut latest: BTreeMap<String, (AttendanceStatus, DateTime<Utc>)> = BTreeMap::new();
        for record in &records {
            for (student_id, status) in &record.students {
                latest.insert(student_id.clone(), (*status, record.updated_at));
            }
        }

        let entries = latest.into_iter().map(|(id, (status, at))| (id, status, at)).collect();
        let (students_updated, cache_failures) = self.mirror(management_id, entries).await;

        let source = records.pop().map(|r| r.date).unwrap_or_default();
        info!("Reconciled {} student caches for class {} (last written {})", students_updated, class_id, source);

        Ok(ReconcileOutcome {
            class_id: class_id.to_string(),
            date: source,
            students_updated,
            cache_failures,
        })
    }

    async fn mirror(
        &self,
        management_id: &str,
        entries: Vec<(String, AttendanceStatus, DateTime<Utc>)>,
    ) -> (usize, Vec<String>) {
        let mut updated = 0;
        let mut failures = Vec::new();

        for (student_id, status, at) in entries {
            match self.students.update_attendance_status(management_id, &student_id, status.as_str(), at).await {
                Ok(true) => updated += 1,
                Ok(false) => {
                    warn!("Student {} vanished before its status cache was written", student_id);
                    failures.push(student_id);
                }
                Err(e) => {
                    warn!("Failed to cache status for student {}: {}", student_id, e);
                    failures.push(student_id);
                }
            }
        }

        (updated, failures)
    }
}

/// The record always names the class's assigned coach; a differing `coachId` in the batch is rejected.
fn recorded_coach(class: &ClassRecord, batch: &AttendanceBatch) -> Result<Option<String>, AppError> {
    match batch.coach_id.as_deref() {
        Some(requested) if class.coach_id.as_deref() != Some(requested) => Err(AppError::Validation(format!(
            "coachId {} is not the assigned coach for this class",
            requested
        ))),
        _ => Ok(class.coach_id.clone()),
    }
}

fn build_maps(batch: &AttendanceBatch) -> (BTreeMap<String, AttendanceStatus>, BTreeMap<String, String>) {
    let mut students = BTreeMap::new();
    let mut leave_reasons = BTreeMap::new();

    for entry in &batch.entries {
        students.insert(entry.student_id.clone(), entry.status);
        if entry.status == AttendanceStatus::ApprovedLeave
            && let Some(reason) = entry.reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
        {
            leave_reasons.insert(entry.student_id.clone(), reason.to_string());
        }
    }

    (students, leave_reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::student::Student;
    use crate::domain::services::attendance_validation::BatchEntry;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryAttendance {
        records: Mutex<HashMap<(String, String, String), AttendanceRecord>>,
    }

    #[async_trait]
    impl AttendanceRepository for MemoryAttendance {
        async fn upsert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, AppError> {
            let key = (record.class_id.clone(), record.date.clone(), record.management_id.clone());
            let mut records = self.records.lock().unwrap();
            let mut stored = record.clone();
            if let Some(existing) = records.get(&key) {
                stored.id = existing.id.clone();
                stored.created_at = existing.created_at;
            }
            records.insert(key, stored.clone());
            Ok(stored)
        }

        async fn find_by_class_and_date(&self, management_id: &str, class_id: &str, date: &str) -> Result<Option<AttendanceRecord>, AppError> {
            let key = (class_id.to_string(), date.to_string(), management_id.to_string());
            Ok(self.records.lock().unwrap().get(&key).cloned())
        }

        async fn list_by_class(&self, management_id: &str, class_id: &str, _from: Option<&str>, _to: Option<&str>) -> Result<Vec<AttendanceRecord>, AppError> {
            let mut out: Vec<_> = self.records.lock().unwrap().values()
                .filter(|r| r.management_id == management_id && r.class_id == class_id)
                .cloned()
                .collect();
            out.sort_by(|a, b| a.date.cmp(&b.date));
            Ok(out)
        }
    }

    #[derive(Default)]
    struct MemoryStudents {
        cache: Mutex<HashMap<String, String>>,
        failing: HashSet<String>,
    }

    impl MemoryStudents {
        fn with(ids: &[&str]) -> Self {
            let cache = ids.iter().map(|id| (id.to_string(), String::new())).collect();
            Self { cache: Mutex::new(cache), failing: HashSet::new() }
        }

        fn status_of(&self, id: &str) -> Option<String> {
            self.cache.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait]
    impl StudentRepository for MemoryStudents {
        async fn create(&self, student: &Student) -> Result<Student, AppError> { Ok(student.clone()) }
        async fn find_by_id(&self, _: &str, _: &str) -> Result<Option<Student>, AppError> { Ok(None) }
        async fn list(&self, _: &str, _: Option<&str>) -> Result<Vec<Student>, AppError> { Ok(vec![]) }
        async fn find_ids_in_class(&self, _: &str, _: &str, ids: &[String]) -> Result<Vec<String>, AppError> { Ok(ids.to_vec()) }
        async fn count_in_class(&self, _: &str, _: &str) -> Result<i64, AppError> { Ok(0) }
        async fn update(&self, student: &Student) -> Result<Student, AppError> { Ok(student.clone()) }
        async fn delete(&self, _: &str, _: &str) -> Result<(), AppError> { Ok(()) }

        async fn update_attendance_status(&self, _: &str, id: &str, status: &str, _: DateTime<Utc>) -> Result<bool, AppError> {
            if self.failing.contains(id) {
                return Err(AppError::InternalWithMsg("write refused".into()));
            }
            let mut cache = self.cache.lock().unwrap();
            match cache.get_mut(id) {
                Some(slot) => {
                    *slot = status.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn class() -> ClassRecord {
        let mut class = ClassRecord::new("M1".into(), "Physics".into());
        class.class_id = "C1".into();
        class.coach_id = Some("K1".into());
        class
    }

    fn entry(id: &str, status: AttendanceStatus, reason: Option<&str>) -> BatchEntry {
        BatchEntry { student_id: id.into(), status, reason: reason.map(String::from) }
    }

    fn batch(date: Option<&str>, entries: Vec<BatchEntry>) -> AttendanceBatch {
        AttendanceBatch {
            class_id: "C1".into(),
            coach_id: None,
            date: date.map(String::from),
            day: "Monday".into(),
            entries,
        }
    }

    fn engine(students: Arc<MemoryStudents>) -> (AttendanceEngine, Arc<MemoryAttendance>) {
        let attendance = Arc::new(MemoryAttendance::default());
        (AttendanceEngine::new(attendance.clone(), students), attendance)
    }

    #[tokio::test]
    async fn leave_reasons_only_kept_for_approved_leave() {
        let students = Arc::new(MemoryStudents::with(&["S1", "S2", "S3"]));
        let (engine, _) = engine(students.clone());

        let outcome = engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![
                entry("S1", AttendanceStatus::Present, Some("ignored")),
                entry("S2", AttendanceStatus::ApprovedLeave, Some("medical")),
                entry("S3", AttendanceStatus::ApprovedLeave, Some("   ")),
            ]), Utc::now())
            .await
            .unwrap();

        let reasons = outcome.record.leave_reasons.clone().unwrap();
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons.get("S2").map(String::as_str), Some("medical"));
        assert_eq!(outcome.record.students.get("S1"), Some(&AttendanceStatus::Present));
        assert_eq!(outcome.record.coach_id.as_deref(), Some("K1"));
        assert_eq!(outcome.students_updated, 3);
        assert_eq!(students.status_of("S2").as_deref(), Some("approved_leave"));
        assert_eq!(outcome.message(), "Attendance saved successfully");
    }

    #[tokio::test]
    async fn resubmission_replaces_and_clears_reasons() {
        let students = Arc::new(MemoryStudents::with(&["S1", "S2"]));
        let (engine, attendance) = engine(students);

        let first = engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![
                entry("S1", AttendanceStatus::Present, None),
                entry("S2", AttendanceStatus::ApprovedLeave, Some("medical")),
            ]), Utc::now())
            .await
            .unwrap();

        let second = engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![
                entry("S2", AttendanceStatus::Present, None),
            ]), Utc::now())
            .await
            .unwrap();

        assert_eq!(second.record.id, first.record.id);
        assert_eq!(second.record.created_at, first.record.created_at);
        assert!(second.record.leave_reasons.is_none());
        assert_eq!(second.record.students.len(), 1);

        let stored = attendance.find_by_class_and_date("M1", "C1", "2024-06-10").await.unwrap().unwrap();
        assert!(!stored.students.contains_key("S1"));
    }

    #[tokio::test]
    async fn missing_date_falls_back_to_kolkata_today() {
        let (engine, _) = engine(Arc::new(MemoryStudents::with(&["S1"])));
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 20, 0, 0).unwrap();

        let outcome = engine
            .apply("M1", &class(), &batch(None, vec![entry("S1", AttendanceStatus::Late, None)]), now)
            .await
            .unwrap();

        assert_eq!(outcome.record.date, "2024-06-10");
    }

    #[tokio::test]
    async fn cache_failures_do_not_roll_back_the_record() {
        let mut students = MemoryStudents::with(&["S1", "S2"]);
        students.failing.insert("S2".into());
        let (engine, attendance) = engine(Arc::new(students));

        let outcome = engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![
                entry("S1", AttendanceStatus::Present, None),
                entry("S2", AttendanceStatus::Absent, None),
            ]), Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome.students_updated, 1);
        assert_eq!(outcome.cache_failures, vec!["S2".to_string()]);
        assert_eq!(outcome.message(), "Attendance saved; 1 of 2 student status caches failed to update");
        assert!(attendance.find_by_class_and_date("M1", "C1", "2024-06-10").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reconcile_rewrites_caches_from_latest_record() {
        let students = Arc::new(MemoryStudents::with(&["S1", "S2"]));
        let (engine, _) = engine(students.clone());

        engine
            .apply("M1", &class(), &batch(Some("2024-06-09"), vec![entry("S1", AttendanceStatus::Absent, None)]), Utc::now())
            .await
            .unwrap();
        engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![entry("S1", AttendanceStatus::Late, None)]), Utc::now())
            .await
            .unwrap();

        students.cache.lock().unwrap().insert("S1".into(), "stale".into());

        let outcome = engine.reconcile_class("M1", "C1").await.unwrap();
        assert_eq!(outcome.date, "2024-06-10");
        assert_eq!(outcome.students_updated, 1);
        assert_eq!(students.status_of("S1").as_deref(), Some("late"));
    }

    #[tokio::test]
    async fn backfilled_day_survives_reconcile() {
        let students = Arc::new(MemoryStudents::with(&["S1"]));
        let (engine, _) = engine(students.clone());
        let first = Utc.with_ymd_and_hms(2024, 6, 10, 5, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 10, 6, 0, 0).unwrap();

        engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![entry("S1", AttendanceStatus::Present, None)]), first)
            .await
            .unwrap();
        engine
            .apply("M1", &class(), &batch(Some("2024-06-09"), vec![entry("S1", AttendanceStatus::Absent, None)]), later)
            .await
            .unwrap();
        assert_eq!(students.status_of("S1").as_deref(), Some("absent"));

        let outcome = engine.reconcile_class("M1", "C1").await.unwrap();
        assert_eq!(outcome.date, "2024-06-09");
        assert_eq!(students.status_of("S1").as_deref(), Some("absent"));
    }

    #[tokio::test]
    async fn reconcile_covers_students_missing_from_the_last_record() {
        let students = Arc::new(MemoryStudents::with(&["S1", "S2"]));
        let (engine, _) = engine(students.clone());
        let first = Utc.with_ymd_and_hms(2024, 6, 9, 5, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 10, 5, 0, 0).unwrap();

        engine
            .apply("M1", &class(), &batch(Some("2024-06-09"), vec![
                entry("S1", AttendanceStatus::Absent, None),
                entry("S2", AttendanceStatus::ApprovedLeave, Some("travel")),
            ]), first)
            .await
            .unwrap();
        engine
            .apply("M1", &class(), &batch(Some("2024-06-10"), vec![entry("S1", AttendanceStatus::Present, None)]), later)
            .await
            .unwrap();

        students.cache.lock().unwrap().insert("S2".into(), String::new());

        let outcome = engine.reconcile_class("M1", "C1").await.unwrap();
        assert_eq!(outcome.students_updated, 2);
        assert_eq!(students.status_of("S1").as_deref(), Some("present"));
        assert_eq!(students.status_of("S2").as_deref(), Some("approved_leave"));
    }

    #[tokio::test]
    async fn foreign_coach_id_is_rejected_before_writing() {
        let (engine, attendance) = engine(Arc::new(MemoryStudents::with(&["S1"])));
        let mut submitted = batch(Some("2024-06-10"), vec![entry("S1", AttendanceStatus::Present, None)]);
        submitted.coach_id = Some("K9".into());

        let result = engine.apply("M1", &class(), &submitted, Utc::now()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(attendance.find_by_class_and_date("M1", "C1", "2024-06-10").await.unwrap().is_none());

        submitted.coach_id = Some("K1".into());
        let outcome = engine.apply("M1", &class(), &submitted, Utc::now()).await.unwrap();
        assert_eq!(outcome.record.coach_id.as_deref(), Some("K1"));
    }

    #[tokio::test]
    async fn reconcile_without_records_is_not_found() {
        let (engine, _) = engine(Arc::new(MemoryStudents::default()));
        assert!(matches!(engine.reconcile_class("M1", "C1").await, Err(AppError::NotFound(_))));
    }
}
