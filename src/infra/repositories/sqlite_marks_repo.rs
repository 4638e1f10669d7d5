use crate::domain::{models::marks::MarkEntry, ports::MarksRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMarksRepo {
    pool: SqlitePool,
}

impl SqliteMarksRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarksRepository for SqliteMarksRepo {
    async fn create(&self, entry: &MarkEntry) -> Result<MarkEntry, AppError> {
        sqlx::query_as::<_, MarkEntry>(
            r#"INSERT INTO marks (id, management_id, student_id, class_id, subject, exam_name, score, max_score, exam_date, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"#
        )
            .bind(&entry.id)
            .bind(&entry.management_id)
            .bind(&entry.student_id)
            .bind(&entry.class_id)
            .bind(&entry.subject)
            .bind(&entry.exam_name)
            .bind(entry.score)
            .bind(entry.max_score)
            .bind(entry.exam_date)
            .bind(entry.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, management_id: &str, id: &str) -> Result<Option<MarkEntry>, AppError> {
        sqlx::query_as::<_, MarkEntry>("SELECT * FROM marks WHERE management_id = ? AND id = ?")
            .bind(management_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str, student_id: Option<&str>, class_id: Option<&str>) -> Result<Vec<MarkEntry>, AppError> {
        sqlx::query_as::<_, MarkEntry>(
            r#"SELECT * FROM marks WHERE management_id = ?
               AND (? IS NULL OR student_id = ?) AND (? IS NULL OR class_id = ?)
               ORDER BY created_at DESC"#
        )
            .bind(management_id)
            .bind(student_id)
            .bind(student_id)
            .bind(class_id)
            .bind(class_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, entry: &MarkEntry) -> Result<MarkEntry, AppError> {
        sqlx::query_as::<_, MarkEntry>(
            r#"UPDATE marks SET subject=?, exam_name=?, score=?, max_score=?, exam_date=?
               WHERE management_id=? AND id=? RETURNING *"#
        )
            .bind(&entry.subject)
            .bind(&entry.exam_name)
            .bind(entry.score)
            .bind(entry.max_score)
            .bind(entry.exam_date)
            .bind(&entry.management_id)
            .bind(&entry.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Mark entry not found".into()))
    }

    async fn delete(&self, management_id: &str, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM marks WHERE management_id = ? AND id = ?")
            .bind(management_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Mark entry not found".into()));
        }
        Ok(())
    }
}
