// src/services/auth.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::user::{Role, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::verify_session,
    },
};

/// Flash shown for every registration attempt; accounts are created by the admin only.
pub const REGISTRATION_DISABLED: &str =
    "Student registration is closed. Only the administrator can sign in.";

/// Result of checking the login form against the users table.
#[derive(Debug)]
pub enum LoginOutcome {
    Success(User),
    InvalidCredentials,
    NotAdmin,
}

pub async fn find_user(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, full_name, password_hash, role, points, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, full_name, password_hash, role, points, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Resolves a session token to its user. Invalid tokens and deleted users are anonymous.
pub async fn current_user(
    pool: &SqlitePool,
    secret: &str,
    token: &str,
) -> Result<Option<User>, AppError> {
    let Some(user_id) = verify_session(token, secret).and_then(|c| c.user_id()) else {
        return Ok(None);
    };

    find_user(pool, user_id).await
}

/// Checks credentials. Only admins may sign in through the login form.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, AppError> {
    let Some(user) = find_user_by_username(pool, username.trim()).await? else {
        return Ok(LoginOutcome::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        return Ok(LoginOutcome::InvalidCredentials);
    }

    if !user.is_admin() {
        return Ok(LoginOutcome::NotAdmin);
    }

    Ok(LoginOutcome::Success(user))
}

/// Inserts a user with a freshly hashed password. Returns the new id.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    full_name: Option<&str>,
    password: &str,
    role: Role,
) -> Result<i64, AppError> {
    let password_hash = hash_password(password)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (username, full_name, password_hash, role, points, created_at)
        VALUES ($1, $2, $3, $4, 0, $5)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(full_name)
    .bind(password_hash)
    .bind(role)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Username '{}' already exists", username))
        }
        _ => {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok(id)
}

/// Creates the configured admin when no admin exists yet.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(pool: &SqlitePool, config: &Config) -> Result<bool, AppError> {
    let has_admin = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await?
        > 0;

    if has_admin {
        return Ok(false);
    }

    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        tracing::warn!("No admin account exists; set ADMIN_USERNAME and ADMIN_PASSWORD to create one");
        return Ok(false);
    };

    tracing::info!("Seeding admin user: {}", username);
    create_user(
        pool,
        username,
        config.admin_full_name.as_deref(),
        password,
        Role::Admin,
    )
    .await?;
    tracing::info!("Admin user created successfully.");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, services::test_support::test_config, utils::jwt::sign_session};

    #[tokio::test]
    async fn only_admins_can_sign_in() {
        let pool = db::memory_pool().await.unwrap();
        create_user(&pool, "root", Some("Root"), "adminpw", Role::Admin).await.unwrap();
        create_user(&pool, "student", None, "studentpw", Role::User).await.unwrap();

        assert!(matches!(
            authenticate(&pool, "  root ", "adminpw").await.unwrap(),
            LoginOutcome::Success(u) if u.username == "root"
        ));
        assert!(matches!(
            authenticate(&pool, "root", "wrong").await.unwrap(),
            LoginOutcome::InvalidCredentials
        ));
        assert!(matches!(
            authenticate(&pool, "ghost", "adminpw").await.unwrap(),
            LoginOutcome::InvalidCredentials
        ));
        assert!(matches!(
            authenticate(&pool, "student", "studentpw").await.unwrap(),
            LoginOutcome::NotAdmin
        ));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let pool = db::memory_pool().await.unwrap();
        create_user(&pool, "dup", None, "pw", Role::User).await.unwrap();
        let err = create_user(&pool, "dup", None, "pw", Role::User).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn current_user_resolves_valid_tokens_only() {
        let pool = db::memory_pool().await.unwrap();
        let id = create_user(&pool, "root", None, "pw", Role::Admin).await.unwrap();

        let token = sign_session(id, "secret").unwrap();
        let user = current_user(&pool, "secret", &token).await.unwrap().unwrap();
        assert_eq!(user.id, id);

        assert!(current_user(&pool, "other", &token).await.unwrap().is_none());

        let stale = sign_session(id + 100, "secret").unwrap();
        assert!(current_user(&pool, "secret", &stale).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let pool = db::memory_pool().await.unwrap();
        let mut config = test_config();

        config.admin_username = None;
        assert!(!ensure_admin(&pool, &config).await.unwrap());

        config.admin_username = Some("boss".to_string());
        config.admin_password = Some("boss-pw".to_string());
        assert!(ensure_admin(&pool, &config).await.unwrap());
        assert!(!ensure_admin(&pool, &config).await.unwrap());

        let admin = find_user_by_username(&pool, "boss").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.points, 0);
    }
}
