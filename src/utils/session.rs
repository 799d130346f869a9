// src/utils/session.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use minijinja::{Value, context};

use crate::{
    error::AppError,
    models::user::User,
    services::auth,
    state::AppState,
    utils::jwt::{sign_flash, sign_session, verify_flash},
    views::Views,
};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

/// Everything a handler needs to know about the visitor, resolved once per request.
///
/// Responses are built through the context so the one-shot flash message is
/// consumed exactly when a page is rendered, and replaced when redirecting.
pub struct RequestContext {
    jar: CookieJar,
    secret: String,
    pub user: Option<User>,
    pub flash: Option<String>,
}

impl<S> FromRequestParts<S> for RequestContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let secret = state.config.session_secret.clone();

        let user = match jar.get(SESSION_COOKIE) {
            Some(cookie) => auth::current_user(&state.pool, &secret, cookie.value()).await?,
            None => None,
        };

        let flash = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| verify_flash(cookie.value(), &secret));

        Ok(Self {
            jar,
            secret,
            user,
            flash,
        })
    }
}

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

impl RequestContext {
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Renders a page. `user` and `flash` are merged into the page context and
    /// the flash cookie is cleared.
    pub fn render(self, views: &Views, template: &str, page: Value) -> Result<Response, AppError> {
        let body = views.render(
            template,
            context! { user => &self.user, flash => &self.flash, ..page },
        )?;

        let jar = if self.flash.is_some() {
            self.jar.remove(removal(FLASH_COOKIE))
        } else {
            self.jar
        };

        Ok((jar, Html(body)).into_response())
    }

    pub fn redirect(self, to: &str) -> Response {
        Redirect::to(to).into_response()
    }

    /// Redirects (303) and leaves a message for the next rendered page.
    pub fn flash_redirect(self, to: &str, message: &str) -> Response {
        match sign_flash(message, &self.secret) {
            Ok(token) => (self.jar.add(cookie(FLASH_COOKIE, token)), Redirect::to(to)).into_response(),
            Err(e) => e.into_response(),
        }
    }

    /// Issues the session cookie for `user_id` and redirects.
    pub fn login(self, user_id: i64, to: &str) -> Result<Response, AppError> {
        let token = sign_session(user_id, &self.secret)?;
        let jar = self.jar.add(cookie(SESSION_COOKIE, token));
        Ok((jar, Redirect::to(to)).into_response())
    }

    pub fn logout(self, to: &str) -> Response {
        (self.jar.remove(removal(SESSION_COOKIE)), Redirect::to(to)).into_response()
    }
}

/// The single "requires: Admin" capability.
///
/// Extracting it fails with a redirect to `/login` for anonymous visitors and
/// for any logged-in user without the admin role, so no admin handler body
/// runs without it.
pub struct AdminSession {
    pub admin: User,
    pub ctx: RequestContext,
}

impl<S> FromRequestParts<S> for AdminSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match ctx.user.clone() {
            Some(user) if user.is_admin() => Ok(Self { admin: user, ctx }),
            Some(user) => {
                tracing::warn!("User {} denied access to {}", user.username, parts.uri.path());
                Err(Redirect::to("/login").into_response())
            }
            None => Err(Redirect::to("/login").into_response()),
        }
    }
}
