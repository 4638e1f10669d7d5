use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::{AppState, Repositories};
use crate::infra::ai::http_ai_backend::HttpAiBackend;
use crate::infra::storage::http_object_storage::HttpObjectStorage;
use crate::infra::repositories::{
    postgres_attendance_repo::PostgresAttendanceRepo, postgres_class_repo::PostgresClassRepo,
    postgres_coach_repo::PostgresCoachRepo, postgres_management_repo::PostgresManagementRepo,
    postgres_marks_repo::PostgresMarksRepo, postgres_student_repo::PostgresStudentRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_attendance_repo::SqliteAttendanceRepo, sqlite_class_repo::SqliteClassRepo,
    sqlite_coach_repo::SqliteCoachRepo, sqlite_management_repo::SqliteManagementRepo,
    sqlite_marks_repo::SqliteMarksRepo, sqlite_student_repo::SqliteStudentRepo,
    sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let acquire_timeout = Duration::from_secs(config.db_acquire_timeout_secs);

    let ai_backend = Arc::new(HttpAiBackend::new(
        config.ai_backend_url.clone(),
        config.ai_backend_token.clone(),
    ));
    let object_storage = Arc::new(HttpObjectStorage::new(
        config.storage_upload_url.clone(),
        config.storage_public_url.clone(),
        config.storage_token.clone(),
    ));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(acquire_timeout)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_repositories(pool)
    };

    AppState::assemble(config.clone(), repos, ai_backend, object_storage)
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        management_repo: Arc::new(SqliteManagementRepo::new(pool.clone())),
        user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
        coach_repo: Arc::new(SqliteCoachRepo::new(pool.clone())),
        class_repo: Arc::new(SqliteClassRepo::new(pool.clone())),
        student_repo: Arc::new(SqliteStudentRepo::new(pool.clone())),
        attendance_repo: Arc::new(SqliteAttendanceRepo::new(pool.clone())),
        marks_repo: Arc::new(SqliteMarksRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        management_repo: Arc::new(PostgresManagementRepo::new(pool.clone())),
        user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
        coach_repo: Arc::new(PostgresCoachRepo::new(pool.clone())),
        class_repo: Arc::new(PostgresClassRepo::new(pool.clone())),
        student_repo: Arc::new(PostgresStudentRepo::new(pool.clone())),
        attendance_repo: Arc::new(PostgresAttendanceRepo::new(pool.clone())),
        marks_repo: Arc::new(PostgresMarksRepo::new(pool)),
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
