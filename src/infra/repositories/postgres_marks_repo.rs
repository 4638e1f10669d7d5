use crate::domain::{models::marks::MarkEntry, ports::MarksRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMarksRepo {
    pool: PgPool,
}

impl PostgresMarksRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarksRepository for PostgresMarksRepo {
    async fn create(&self, entry: &MarkEntry) -> Result<MarkEntry, AppError> {
        sqlx::query_as::<_, MarkEntry>(
            r#"INSERT INTO marks (id, management_id, student_id, class_id, subject, exam_name, score, max_score, exam_date, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *"#
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
        sqlx::query_as::<_, MarkEntry>("SELECT * FROM marks WHERE management_id = $1 AND id = $2")
            .bind(management_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str, student_id: Option<&str>, class_id: Option<&str>) -> Result<Vec<MarkEntry>, AppError> {
        sqlx::query_as::<_, MarkEntry>(
            r#"SELECT * FROM marks WHERE management_id = $1
               AND ($2 IS NULL OR student_id = $3) AND ($4 IS NULL OR class_id = $5)
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
            r#"UPDATE marks SET subject=$1, exam_name=$2, score=$3, max_score=$4, exam_date=$5
               WHERE management_id=$6 AND id=$7 RETURNING *"#
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
        let res = sqlx::query("DELETE FROM marks WHERE management_id = $1 AND id = $2")
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
