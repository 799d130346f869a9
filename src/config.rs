// src/config.rs

use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Questions shown per page when browsing a subject.
pub const QUESTIONS_PER_PAGE: i64 = 50;

/// Number of users shown on the dashboard leaderboard.
pub const LEADERBOARD_SIZE: i64 = 10;

/// Number of recent questions listed on the admin page.
pub const ADMIN_RECENT_QUESTIONS: i64 = 50;

/// Request body limit for multipart forms (image uploads, CSV imports).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub static_dir: PathBuf,
    pub log_dir: String,
    pub app_name: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_full_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://app.db".to_string());

        let session_secret = env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Question Bank".to_string());

        Self {
            database_url,
            session_secret,
            rust_log,
            bind_addr,
            static_dir,
            log_dir,
            app_name,
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            admin_full_name: non_empty_var("ADMIN_FULL_NAME"),
        }
    }

    /// Directory uploaded question images are written to.
    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join("uploads")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
