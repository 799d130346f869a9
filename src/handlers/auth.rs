// src/handlers/auth.rs

use axum::{Form, extract::State, response::Response};
use minijinja::context;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::first_message,
        user::LoginRequest,
    },
    services::auth::{self, LoginOutcome, REGISTRATION_DISABLED},
    utils::session::RequestContext,
    views::Views,
};

pub async fn register_page(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    ctx.render(&views, "register.html", context! {})
}

/// Self-registration is closed. The body is never read, so every submission
/// is turned away the same way whatever its encoding.
pub async fn register(ctx: RequestContext) -> Response {
    tracing::info!("Rejected a registration attempt");
    ctx.flash_redirect("/register", REGISTRATION_DISABLED)
}

pub async fn login_page(
    State(views): State<Views>,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    ctx.render(&views, "login.html", context! {})
}

/// Signs the administrator in and sends them to the dashboard.
///
/// Unknown users and wrong passwords share one message; valid non-admin
/// accounts get their own.
pub async fn login(
    State(pool): State<SqlitePool>,
    ctx: RequestContext,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Ok(ctx.flash_redirect("/login", &first_message(&validation_errors)));
    }

    match auth::authenticate(&pool, &payload.username, &payload.password).await? {
        LoginOutcome::Success(user) => {
            tracing::info!("User {} signed in", user.username);
            ctx.login(user.id, "/dashboard")
        }
        LoginOutcome::InvalidCredentials => {
            tracing::warn!("Failed login for {:?}", payload.username.trim());
            Ok(ctx.flash_redirect("/login", "Invalid username or password."))
        }
        LoginOutcome::NotAdmin => {
            tracing::warn!("Non-admin login refused for {:?}", payload.username.trim());
            Ok(ctx.flash_redirect("/login", "Only the administrator can sign in."))
        }
    }
}

pub async fn logout(ctx: RequestContext) -> Response {
    ctx.logout("/")
}
