use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub session_secret: String,
    pub production: bool,
    pub ai_backend_url: String,
    pub ai_backend_token: Option<String>,
    pub storage_upload_url: String,
    pub storage_public_url: String,
    pub storage_token: String,
    pub db_acquire_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            session_secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set (HMAC key for session cookies)"),
            production: env::var("APP_ENV").map(|v| v == "production").unwrap_or(false),
            ai_backend_url: env::var("AI_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8001".to_string()),
            ai_backend_token: env::var("AI_BACKEND_TOKEN").ok().filter(|t| !t.is_empty()),
            storage_upload_url: env::var("STORAGE_UPLOAD_URL").unwrap_or_else(|_| "http://localhost:9000/upload".to_string()),
            storage_public_url: env::var("STORAGE_PUBLIC_URL").unwrap_or_else(|_| "http://localhost:9000/files".to_string()),
            storage_token: env::var("STORAGE_TOKEN").unwrap_or_else(|_| "dev-token".to_string()),
            db_acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}
