use crate::domain::{
    models::attendance::{AttendanceRecord, AttendanceRow},
    ports::AttendanceRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAttendanceRepo {
    pool: SqlitePool,
}

impl SqliteAttendanceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for SqliteAttendanceRepo {
    async fn upsert(&self, record: &AttendanceRecord) -> Result<AttendanceRecord, AppError> {
        let students = record.students_json()?;
        let leave_reasons = record.leave_reasons_json()?;

        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"INSERT INTO attendance_records (id, management_id, class_id, coach_id, date, day, students, leave_reasons, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(class_id, date, management_id) DO UPDATE SET
               coach_id=excluded.coach_id,
               day=excluded.day,
               students=excluded.students,
               leave_reasons=excluded.leave_reasons,
               updated_at=excluded.updated_at
               RETURNING *"#
        )
            .bind(&record.id)
            .bind(&record.management_id)
            .bind(&record.class_id)
            .bind(&record.coach_id)
            .bind(&record.date)
            .bind(&record.day)
            .bind(students)
            .bind(leave_reasons)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        row.try_into()
    }

    async fn find_by_class_and_date(&self, management_id: &str, class_id: &str, date: &str) -> Result<Option<AttendanceRecord>, AppError> {
        sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance_records WHERE management_id = ? AND class_id = ? AND date = ?"
        )
            .bind(management_id)
            .bind(class_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn list_by_class(&self, management_id: &str, class_id: &str, from: Option<&str>, to: Option<&str>) -> Result<Vec<AttendanceRecord>, AppError> {
        sqlx::query_as::<_, AttendanceRow>(
            r#"SELECT * FROM attendance_records
               WHERE management_id = ? AND class_id = ?
               AND (? IS NULL OR date >= ?) AND (? IS NULL OR date <= ?)
               ORDER BY date ASC"#
        )
            .bind(management_id)
            .bind(class_id)
            .bind(from)
            .bind(from)
            .bind(to)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }
}
