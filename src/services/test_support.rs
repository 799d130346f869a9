// Shared fixtures for service tests.

use std::path::PathBuf;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    models::{
        question::{Choice, ExamType, NewQuestion, Source},
        user::Role,
    },
    services::{auth, content},
};

pub(crate) fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test-secret".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: PathBuf::from("static"),
        log_dir: "logs".to_string(),
        app_name: "Test Bank".to_string(),
        admin_username: None,
        admin_password: None,
        admin_full_name: None,
    }
}

pub(crate) fn new_question(subject_id: i64, text: &str) -> NewQuestion {
    NewQuestion {
        subject_id,
        exam_type: ExamType::Mid,
        question_text: text.to_string(),
        choice_a: "first".to_string(),
        choice_b: "second".to_string(),
        choice_c: "third".to_string(),
        choice_d: "fourth".to_string(),
        correct_choice: Choice::B,
        image_path: None,
        source: Source::Past,
        explanation: Some("because".to_string()),
    }
}

pub(crate) async fn subject(pool: &SqlitePool, name: &str) -> i64 {
    content::create_subject(pool, name).await.unwrap().id
}

pub(crate) async fn question(pool: &SqlitePool, subject_id: i64, text: &str) -> i64 {
    content::create_question(pool, &new_question(subject_id, text))
        .await
        .unwrap()
}

pub(crate) async fn student(pool: &SqlitePool, username: &str) -> i64 {
    auth::create_user(pool, username, None, "password", Role::User)
        .await
        .unwrap()
}
