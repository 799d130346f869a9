// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::MAX_UPLOAD_BYTES,
    handlers::{admin, auth, contribution, pages, quiz, transfer},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (public pages, auth, admin).
/// * Serves the static root (stylesheet, uploaded images) under `/static`.
/// * Applies global middleware (Trace, body limit).
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/questions", get(pages::questions_home))
        .route("/questions/past", get(pages::questions_past))
        .route("/404", get(pages::not_found_page))
        .route("/subjects", get(quiz::subjects_list))
        .route("/subjects/{id}", get(quiz::subject_view))
        .route("/questions/{id}", get(quiz::question_view))
        .route("/questions/{id}/answer", post(quiz::answer))
        .route("/questions/{id}/result", get(quiz::result))
        .route("/questions/{id}/report", post(contribution::report_question))
        .route("/dashboard", get(quiz::dashboard))
        .route("/contact", get(contribution::contact_page))
        .route("/contact/suggest", post(contribution::suggest_question))
        .route("/contact/message", post(contribution::send_message));

    let auth_routes = Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout));

    // Every admin handler extracts `AdminSession`, which redirects to /login
    // before the handler body runs.
    let admin_routes = Router::new()
        .route("/", get(admin::dashboard))
        .route("/subjects/create", post(admin::create_subject))
        .route("/subjects/{id}/update", post(admin::rename_subject))
        .route("/subjects/{id}/delete", post(admin::delete_subject))
        .route("/questions/create", post(admin::create_question))
        .route("/questions/{id}/edit", get(admin::edit_question))
        .route("/questions/{id}/update", post(admin::update_question))
        .route("/questions/{id}/delete", post(admin::delete_question))
        .route("/suggestions/{id}/publish", post(admin::publish_suggestion))
        .route("/suggestions/{id}/reject", post(admin::reject_suggestion))
        .route("/reports/{id}/resolve", post(admin::resolve_report))
        .route("/export.csv", get(transfer::export_csv))
        .route("/import.csv", post(transfer::import_csv));

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .nest("/admin", admin_routes)
        .nest_service("/static", static_files)
        .fallback(pages::fallback)
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
