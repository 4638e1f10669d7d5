use crate::domain::{models::class::ClassRecord, ports::ClassRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresClassRepo {
    pool: PgPool,
}

impl PostgresClassRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassRepository for PostgresClassRepo {
    async fn create(&self, class: &ClassRecord) -> Result<ClassRecord, AppError> {
        sqlx::query_as::<_, ClassRecord>(
            "INSERT INTO classes (class_id, management_id, name, batch, subject, coach_id, schedule, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"
        )
            .bind(&class.class_id)
            .bind(&class.management_id)
            .bind(&class.name)
            .bind(&class.batch)
            .bind(&class.subject)
            .bind(&class.coach_id)
            .bind(&class.schedule)
            .bind(class.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, management_id: &str, class_id: &str) -> Result<Option<ClassRecord>, AppError> {
        sqlx::query_as::<_, ClassRecord>("SELECT * FROM classes WHERE management_id = $1 AND class_id = $2")
            .bind(management_id)
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str) -> Result<Vec<ClassRecord>, AppError> {
        sqlx::query_as::<_, ClassRecord>("SELECT * FROM classes WHERE management_id = $1 ORDER BY name ASC")
            .bind(management_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_coach(&self, management_id: &str, coach_id: &str) -> Result<Vec<ClassRecord>, AppError> {
        sqlx::query_as::<_, ClassRecord>(
            "SELECT * FROM classes WHERE management_id = $1 AND coach_id = $2 ORDER BY name ASC"
        )
            .bind(management_id)
            .bind(coach_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, class: &ClassRecord) -> Result<ClassRecord, AppError> {
        sqlx::query_as::<_, ClassRecord>(
            "UPDATE classes SET name=$1, batch=$2, subject=$3, coach_id=$4, schedule=$5 WHERE management_id=$6 AND class_id=$7 RETURNING *"
        )
            .bind(&class.name)
            .bind(&class.batch)
            .bind(&class.subject)
            .bind(&class.coach_id)
            .bind(&class.schedule)
            .bind(&class.management_id)
            .bind(&class.class_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Class not found".into()))
    }

    async fn delete(&self, management_id: &str, class_id: &str) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM classes WHERE management_id = $1 AND class_id = $2")
            .bind(management_id)
            .bind(class_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Class not found".into()));
        }
        Ok(())
    }
}
