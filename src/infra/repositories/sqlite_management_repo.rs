use crate::domain::{
    models::{management::{Management, ManagementStats}, user::User},
    ports::ManagementRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteManagementRepo {
    pool: SqlitePool,
}

impl SqliteManagementRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str, management_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(management_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl ManagementRepository for SqliteManagementRepo {
    async fn create_with_admin(&self, management: &Management, admin: &User) -> Result<(Management, User), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Management>(
            "INSERT INTO managements (management_id, name, email_domain, admin_id, num_coaches, num_students, logo, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&management.management_id)
            .bind(&management.name)
            .bind(&management.email_domain)
            .bind(&admin.id)
            .bind(management.num_coaches)
            .bind(management.num_students)
            .bind(&management.logo)
            .bind(management.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, management_id, email, password_hash, name, role, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&admin.id)
            .bind(&created.management_id)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .bind(&admin.name)
            .bind(&admin.role)
            .bind(admin.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created, user))
    }

    async fn find_by_id(&self, management_id: &str) -> Result<Option<Management>, AppError> {
        sqlx::query_as::<_, Management>("SELECT * FROM managements WHERE management_id = ?")
            .bind(management_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_domain(&self, email_domain: &str) -> Result<Option<Management>, AppError> {
        sqlx::query_as::<_, Management>("SELECT * FROM managements WHERE email_domain = ?")
            .bind(email_domain)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, management: &Management) -> Result<Management, AppError> {
        sqlx::query_as::<_, Management>(
            "UPDATE managements SET name=?, logo=?, num_coaches=?, num_students=? WHERE management_id=? RETURNING *"
        )
            .bind(&management.name)
            .bind(&management.logo)
            .bind(management.num_coaches)
            .bind(management.num_students)
            .bind(&management.management_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn stats(&self, management_id: &str, today: &str) -> Result<ManagementStats, AppError> {
        let attendance_records_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance_records WHERE management_id = ? AND date = ?"
        )
            .bind(management_id)
            .bind(today)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(ManagementStats {
            total_classes: self.count("SELECT COUNT(*) FROM classes WHERE management_id = ?", management_id).await?,
            total_coaches: self.count("SELECT COUNT(*) FROM coaches WHERE management_id = ?", management_id).await?,
            total_students: self.count("SELECT COUNT(*) FROM students WHERE management_id = ?", management_id).await?,
            total_users: self.count("SELECT COUNT(*) FROM users WHERE management_id = ?", management_id).await?,
            attendance_records_today,
            date: today.to_string(),
        })
    }
}
