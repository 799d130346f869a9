// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    pub full_name: Option<String>,

    /// Argon2 password hash.
    /// Skipped during serialization so it never reaches a template.
    #[serde(skip)]
    pub password_hash: String,

    pub role: Role,

    /// Number of distinct questions answered correctly at least once.
    pub points: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Aggregated answer counts for the dashboard.
#[derive(Debug, Default, Clone, FromRow, Serialize)]
pub struct AttemptStats {
    pub total_attempts: i64,
    pub total_correct: i64,
}

/// A row of the points leaderboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub points: i64,
}

/// DTO for the login form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 128, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required."))]
    pub password: String,
}
