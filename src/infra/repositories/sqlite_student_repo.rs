use std::collections::HashSet;
use crate::domain::{models::student::Student, ports::StudentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteStudentRepo {
    pool: SqlitePool,
}

impl SqliteStudentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepo {
    async fn create(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"INSERT INTO students (id, management_id, class_id, name, email, phone, roll_number, batch, attendance_status, attendance_updated_at, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"#
        )
            .bind(&student.id)
            .bind(&student.management_id)
            .bind(&student.class_id)
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.phone)
            .bind(&student.roll_number)
            .bind(&student.batch)
            .bind(&student.attendance_status)
            .bind(student.attendance_updated_at)
            .bind(student.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, management_id: &str, id: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE management_id = ? AND id = ?")
            .bind(management_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str, class_id: Option<&str>) -> Result<Vec<Student>, AppError> {
        sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE management_id = ? AND (? IS NULL OR class_id = ?) ORDER BY name ASC"
        )
            .bind(management_id)
            .bind(class_id)
            .bind(class_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_ids_in_class(&self, management_id: &str, class_id: &str, ids: &[String]) -> Result<Vec<String>, AppError> {
        let enrolled: HashSet<String> = sqlx::query_scalar::<_, String>(
            "SELECT id FROM students WHERE management_id = ? AND class_id = ?"
        )
            .bind(management_id)
            .bind(class_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?
            .into_iter()
            .collect();

        Ok(ids.iter().filter(|id| enrolled.contains(*id)).cloned().collect())
    }

    async fn count_in_class(&self, management_id: &str, class_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE management_id = ? AND class_id = ?")
            .bind(management_id)
            .bind(class_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"UPDATE students SET class_id=?, name=?, email=?, phone=?, roll_number=?, batch=?
               WHERE management_id=? AND id=? RETURNING *"#
        )
            .bind(&student.class_id)
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.phone)
            .bind(&student.roll_number)
            .bind(&student.batch)
            .bind(&student.management_id)
            .bind(&student.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Student not found".into()))
    }

    async fn delete(&self, management_id: &str, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM students WHERE management_id = ? AND id = ?")
            .bind(management_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Student not found".into()));
        }
        Ok(())
    }

    async fn update_attendance_status(
        &self,
        management_id: &str,
        id: &str,
        status: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let res = sqlx::query(
            "UPDATE students SET attendance_status = ?, attendance_updated_at = ? WHERE management_id = ? AND id = ?"
        )
            .bind(status)
            .bind(at)
            .bind(management_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(res.rows_affected() > 0)
    }
}
