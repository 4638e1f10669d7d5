use std::collections::HashSet;
use crate::domain::{models::student::Student, ports::StudentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresStudentRepo {
    pool: PgPool,
}

impl PostgresStudentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for PostgresStudentRepo {
    async fn create(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"INSERT INTO students (id, management_id, class_id, name, email, phone, roll_number, batch, attendance_status, attendance_updated_at, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *"#
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
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE management_id = $1 AND id = $2")
            .bind(management_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str, class_id: Option<&str>) -> Result<Vec<Student>, AppError> {
        sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE management_id = $1 AND ($2 IS NULL OR class_id = $3) ORDER BY name ASC"
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
            "SELECT id FROM students WHERE management_id = $1 AND class_id = $2"
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
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE management_id = $1 AND class_id = $2")
            .bind(management_id)
            .bind(class_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            r#"UPDATE students SET class_id=$1, name=$2, email=$3, phone=$4, roll_number=$5, batch=$6
               WHERE management_id=$7 AND id=$8 RETURNING *"#
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
        let res = sqlx::query("DELETE FROM students WHERE management_id = $1 AND id = $2")
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
            "UPDATE students SET attendance_status = $1, attendance_updated_at = $2 WHERE management_id = $3 AND id = $4"
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
