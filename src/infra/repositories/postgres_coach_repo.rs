use crate::domain::{models::coach::Coach, ports::CoachRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCoachRepo {
    pool: PgPool,
}

impl PostgresCoachRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoachRepository for PostgresCoachRepo {
    async fn create(&self, coach: &Coach) -> Result<Coach, AppError> {
        sqlx::query_as::<_, Coach>(
            "INSERT INTO coaches (coach_id, management_id, name, email, phone, subject, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&coach.coach_id)
            .bind(&coach.management_id)
            .bind(&coach.name)
            .bind(&coach.email)
            .bind(&coach.phone)
            .bind(&coach.subject)
            .bind(coach.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, management_id: &str, coach_id: &str) -> Result<Option<Coach>, AppError> {
        sqlx::query_as::<_, Coach>("SELECT * FROM coaches WHERE management_id = $1 AND coach_id = $2")
            .bind(management_id)
            .bind(coach_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, management_id: &str, email: &str) -> Result<Option<Coach>, AppError> {
        sqlx::query_as::<_, Coach>("SELECT * FROM coaches WHERE management_id = $1 AND LOWER(email) = $2")
            .bind(management_id)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, management_id: &str) -> Result<Vec<Coach>, AppError> {
        sqlx::query_as::<_, Coach>("SELECT * FROM coaches WHERE management_id = $1 ORDER BY name ASC")
            .bind(management_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, coach: &Coach) -> Result<Coach, AppError> {
        sqlx::query_as::<_, Coach>(
            "UPDATE coaches SET name=$1, email=$2, phone=$3, subject=$4 WHERE management_id=$5 AND coach_id=$6 RETURNING *"
        )
            .bind(&coach.name)
            .bind(&coach.email)
            .bind(&coach.phone)
            .bind(&coach.subject)
            .bind(&coach.management_id)
            .bind(&coach.coach_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Coach not found".into()))
    }

    async fn delete(&self, management_id: &str, coach_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let res = sqlx::query("DELETE FROM coaches WHERE management_id = $1 AND coach_id = $2")
            .bind(management_id)
            .bind(coach_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Coach not found".into()));
        }

        sqlx::query("UPDATE classes SET coach_id = NULL WHERE management_id = $1 AND coach_id = $2")
            .bind(management_id)
            .bind(coach_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)
    }
}
