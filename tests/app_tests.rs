// tests/app_tests.rs

use question_bank::{
    config::Config,
    db,
    models::{
        question::{Choice, ExamType, NewQuestion, Source},
        suggestion::SuggestionStatus,
        user::Role,
    },
    routes,
    services::{auth, content, moderation},
    state::AppState,
    views::Views,
};
use reqwest::{
    StatusCode, header,
    multipart::{Form, Part},
    redirect::Policy,
};
use sqlx::SqlitePool;

const ADMIN_PASSWORD: &str = "correct horse battery staple";

struct TestApp {
    address: String,
    pool: SqlitePool,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn post_multipart(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn login_admin(&self) {
        let response = self
            .post_form("/login", &[("username", " admin "), ("password", ADMIN_PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    async fn attempt_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attempts")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

fn location(response: &reqwest::Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Helper function to spawn the app on a random port for testing.
/// Uses a fresh in-memory database with one admin account.
async fn spawn_app() -> TestApp {
    // 1. Create a pool with the schema applied
    let pool = db::memory_pool().await.expect("Failed to create test database");

    auth::create_user(&pool, "admin", Some("Site Admin"), ADMIN_PASSWORD, Role::Admin)
        .await
        .expect("Failed to create admin");

    // 2. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        session_secret: "test_secret_for_integration_tests".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        static_dir: std::env::temp_dir().join(format!("qb-static-{}", uuid::Uuid::new_v4())),
        log_dir: "logs".to_string(),
        app_name: "Test Bank".to_string(),
        admin_username: None,
        admin_password: None,
        admin_full_name: None,
    };
    let views = Views::new(&config.app_name).expect("Failed to load templates");

    let state = AppState {
        pool: pool.clone(),
        config,
        views,
    };

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client,
    }
}

/// The admin question form with every text field filled in.
fn question_form(subject_id: i64, text: &str, correct: &str) -> Form {
    Form::new()
        .text("subject_id", subject_id.to_string())
        .text("exam_type", "final")
        .text("source", "past")
        .text("question_text", text.to_string())
        .text("choice_a", "2")
        .text("choice_b", "3")
        .text("choice_c", "4")
        .text("choice_d", "5")
        .text("correct_choice", correct.to_string())
        .text("explanation", "Count them.")
}

fn file_part(name: &str, mime: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

async fn seed_question(pool: &SqlitePool) -> i64 {
    let subject = content::create_subject(pool, "Geography").await.unwrap();
    content::create_question(
        pool,
        &NewQuestion {
            subject_id: subject.id,
            exam_type: ExamType::Mid,
            question_text: "Capital of France?".to_string(),
            choice_a: "Lyon".to_string(),
            choice_b: "Paris".to_string(),
            choice_c: "Nice".to_string(),
            choice_d: "Lille".to_string(),
            correct_choice: Choice::B,
            image_path: None,
            source: Source::Past,
            explanation: Some("Paris is the capital.".to_string()),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn unknown_path_renders_not_found_page() {
    let app = spawn_app().await;

    let response = app.get("/random_path_that_does_not_exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("Page not found"));
}

#[tokio::test]
async fn public_pages_render() {
    let app = spawn_app().await;

    for path in ["/", "/questions", "/questions/past", "/contact", "/login", "/register", "/404"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        assert!(response.text().await.unwrap().contains("Test Bank"));
    }
}

#[tokio::test]
async fn registration_is_always_refused() {
    let app = spawn_app().await;

    let response = app
        .post_form(
            "/register",
            &[("username", "newbie"), ("password", "secret"), ("full_name", "New")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let page = app.get("/register").await.text().await.unwrap();
    assert!(page.contains(auth::REGISTRATION_DISABLED));

    // The flash is shown once.
    let again = app.get("/register").await.text().await.unwrap();
    assert!(!again.contains(auth::REGISTRATION_DISABLED));

    assert!(auth::find_user_by_username(&app.pool, "newbie").await.unwrap().is_none());
}

#[tokio::test]
async fn registration_is_refused_whatever_the_body() {
    let app = spawn_app().await;

    let form = Form::new()
        .text("username", "newbie")
        .text("password", "secret");
    let response = app.post_multipart("/register", form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let response = app.client.post(app.url("/register")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/register");

    let page = app.get("/register").await.text().await.unwrap();
    assert!(page.contains(auth::REGISTRATION_DISABLED));
    assert!(auth::find_user_by_username(&app.pool, "newbie").await.unwrap().is_none());
}

#[tokio::test]
async fn login_failures_get_distinct_messages() {
    let app = spawn_app().await;
    auth::create_user(&app.pool, "student", None, "studentpw", Role::User)
        .await
        .unwrap();

    let response = app
        .post_form("/login", &[("username", "admin"), ("password", "wrong")])
        .await;
    assert_eq!(location(&response), "/login");
    let page = app.get("/login").await.text().await.unwrap();
    assert!(page.contains("Invalid username or password."));

    let response = app
        .post_form("/login", &[("username", "student"), ("password", "studentpw")])
        .await;
    assert_eq!(location(&response), "/login");
    let page = app.get("/login").await.text().await.unwrap();
    assert!(page.contains("Only the administrator can sign in."));

    // Still anonymous.
    let response = app.get("/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn admin_signs_in_and_out() {
    let app = spawn_app().await;
    app.login_admin().await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(dashboard.text().await.unwrap().contains("Leaderboard"));

    assert_eq!(app.get("/admin").await.status(), StatusCode::OK);

    let response = app.get("/logout").await;
    assert_eq!(location(&response), "/");

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn admin_routes_redirect_anonymous_visitors() {
    let app = spawn_app().await;

    for path in ["/admin", "/admin/export.csv", "/admin/questions/1/edit"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), "/login");
    }

    let response = app
        .post_form("/admin/subjects/create", &[("name", "Sneaky")])
        .await;
    assert_eq!(location(&response), "/login");
    assert!(content::list_subjects(&app.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_subject_is_reported_with_a_flash() {
    let app = spawn_app().await;
    app.login_admin().await;

    let first = app
        .post_form("/admin/subjects/create", &[("name", "Algebra")])
        .await;
    assert_eq!(location(&first), "/admin");
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Subject created."));

    let second = app
        .post_form("/admin/subjects/create", &[("name", "  Algebra ")])
        .await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("A subject with that name already exists."));

    assert_eq!(content::list_subjects(&app.pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn anonymous_answers_are_graded_but_not_stored() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;

    let response = app
        .post_form(&format!("/questions/{question_id}/answer"), &[("choice", "B")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Correct!"));

    let response = app
        .post_form(&format!("/questions/{question_id}/answer"), &[("choice", "C")])
        .await;
    assert!(response.text().await.unwrap().contains("Not quite."));

    assert_eq!(app.attempt_count().await, 0);
}

#[tokio::test]
async fn signed_in_answer_is_recorded_once_per_submission() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;
    app.login_admin().await;

    let response = app
        .post_form(&format!("/questions/{question_id}/answer"), &[("choice", "B")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/questions/{question_id}/result"));
    assert_eq!(app.attempt_count().await, 1);

    let result = app
        .get(&format!("/questions/{question_id}/result"))
        .await
        .text()
        .await
        .unwrap();
    assert!(result.contains("Correct!"));

    app.post_form(&format!("/questions/{question_id}/answer"), &[("choice", "B")])
        .await;
    assert_eq!(app.attempt_count().await, 2);

    let admin = auth::find_user_by_username(&app.pool, "admin").await.unwrap().unwrap();
    assert_eq!(admin.points, 1);
}

#[tokio::test]
async fn missing_entities_redirect_home() {
    let app = spawn_app().await;

    for path in ["/questions/999", "/questions/999/result", "/subjects/999?source=ai"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), "/");
    }

    let response = app
        .post_form("/questions/999/report", &[("report_text", "broken")])
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn invalid_exam_sends_visitors_to_the_picker() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;
    let subject_id = content::find_question(&app.pool, question_id)
        .await
        .unwrap()
        .unwrap()
        .subject_id;

    let response = app.get("/subjects?source=past&exam=quiz").await;
    assert_eq!(location(&response), "/questions/past");

    let response = app.get(&format!("/subjects/{subject_id}?exam=nope")).await;
    assert_eq!(location(&response), "/questions/past");

    let page = app
        .get(&format!("/subjects/{subject_id}?source=bogus&exam=mid&page=abc"))
        .await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("Capital of France?"));
}

#[tokio::test]
async fn csv_export_and_import() {
    let app = spawn_app().await;
    seed_question(&app.pool).await;
    app.login_admin().await;

    let response = app.get("/admin/export.csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("questions.csv"));
    let body = response.text().await.unwrap();
    assert!(body.starts_with("id,subject,exam_type,question_text,"));
    assert!(body.contains("Capital of France?"));

    let upload = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(body.into_bytes())
            .file_name("questions.csv")
            .mime_str("text/csv")
            .unwrap(),
    );
    let response = app
        .client
        .post(app.url("/admin/import.csv"))
        .multipart(upload)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/admin");

    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Imported 1 questions."));
    assert_eq!(content::count_questions(&app.pool).await.unwrap(), 2);
}

#[tokio::test]
async fn report_and_resolve_round_trip() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;

    let response = app
        .post_form(
            &format!("/questions/{question_id}/report"),
            &[("report_text", "The answer should be C"), ("proposed_correct_choice", "C")],
        )
        .await;
    assert_eq!(location(&response), format!("/questions/{question_id}"));

    app.login_admin().await;
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("The answer should be C"));

    let report_id: i64 = sqlx::query_scalar("SELECT id FROM reports")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let response = app
        .post_form(
            &format!("/admin/reports/{report_id}/resolve"),
            &[("correct_choice", "C"), ("explanation", "Checked the atlas.")],
        )
        .await;
    assert_eq!(location(&response), "/admin");

    let fixed = content::find_question(&app.pool, question_id).await.unwrap().unwrap();
    assert_eq!(fixed.correct_choice, Choice::C);
    assert_eq!(fixed.explanation.as_deref(), Some("Checked the atlas."));
}

#[tokio::test]
async fn admin_question_form_ignores_non_image_uploads() {
    let app = spawn_app().await;
    let subject = content::create_subject(&app.pool, "Arithmetic").await.unwrap();
    app.login_admin().await;

    let form = question_form(subject.id, "How many sides has a square?", "D")
        .part("image", file_part("notes.txt", "text/plain", b"not an image"));
    let response = app.post_multipart("/admin/questions/create", form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Question added."));

    let questions = content::recent_questions(&app.pool, 10).await.unwrap();
    assert_eq!(questions.len(), 1);
    let created = &questions[0].question;
    assert_eq!(created.question_text, "How many sides has a square?");
    assert_eq!(created.exam_type, ExamType::Final);
    assert_eq!(created.correct_choice, Choice::D);
    assert_eq!(created.image_path, None);
}

#[tokio::test]
async fn admin_question_update_stores_and_keeps_the_image() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;
    let subject_id = content::find_question(&app.pool, question_id)
        .await
        .unwrap()
        .unwrap()
        .subject_id;
    app.login_admin().await;
    let update_url = format!("/admin/questions/{question_id}/update");
    let edit_url = format!("/admin/questions/{question_id}/edit");

    let png = b"\x89PNG\r\n\x1a\nfake image";
    let form = question_form(subject_id, "Capital of Italy?", "B")
        .part("image", file_part("map.png", "image/png", png));
    let response = app.post_multipart(&update_url, form).await;
    assert_eq!(location(&response), edit_url);

    let updated = content::find_question(&app.pool, question_id).await.unwrap().unwrap();
    assert_eq!(updated.question_text, "Capital of Italy?");
    let image_path = updated.image_path.clone().unwrap();
    assert!(image_path.starts_with("uploads/"));
    assert!(image_path.ends_with(".png"));

    let served = app.get(&format!("/static/{image_path}")).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), png.as_slice());

    // A browser sends an empty, unnamed file part when no image is chosen.
    let form = question_form(subject_id, "Capital of Spain?", "C")
        .part("image", file_part("", "application/octet-stream", b""));
    let response = app.post_multipart(&update_url, form).await;
    assert_eq!(location(&response), edit_url);

    let page = app.get(&edit_url).await.text().await.unwrap();
    assert!(page.contains("Question updated."));

    let kept = content::find_question(&app.pool, question_id).await.unwrap().unwrap();
    assert_eq!(kept.question_text, "Capital of Spain?");
    assert_eq!(kept.correct_choice, Choice::C);
    assert_eq!(kept.image_path.as_deref(), Some(image_path.as_str()));
}

#[tokio::test]
async fn suggestions_are_published_or_rejected() {
    let app = spawn_app().await;
    let subject = content::create_subject(&app.pool, "Biology").await.unwrap();

    for text in ["What do plants absorb?", "Spam spam spam"] {
        let form = Form::new()
            .text("subject_name", "Biology")
            .text("exam_type", "mid")
            .text("question_text", text)
            .text("choice_a", "Oxygen")
            .text("choice_b", "Carbon dioxide")
            .text("choice_c", "Helium")
            .text("choice_d", "Neon")
            .text("proposed_correct_choice", "B");
        let response = app.post_multipart("/contact/suggest", form).await;
        assert_eq!(location(&response), "/contact");
    }

    let suggestions = moderation::list_suggestions(&app.pool).await.unwrap();
    assert_eq!(suggestions.len(), 2);
    let find = |text: &str| {
        suggestions
            .iter()
            .find(|s| s.question_text.as_deref() == Some(text))
            .map(|s| s.id)
            .unwrap()
    };
    let good = find("What do plants absorb?");
    let spam = find("Spam spam spam");

    app.login_admin().await;
    let subject_id = subject.id.to_string();
    let response = app
        .post_form(
            &format!("/admin/suggestions/{good}/publish"),
            &[("subject_id", subject_id.as_str()), ("exam_type", "final")],
        )
        .await;
    assert_eq!(location(&response), "/admin");
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Suggestion published as a question."));

    let questions = content::recent_questions(&app.pool, 10).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].subject_name, "Biology");
    assert_eq!(questions[0].question.question_text, "What do plants absorb?");
    assert_eq!(questions[0].question.exam_type, ExamType::Final);

    // Publishing twice does not duplicate the question.
    app.post_form(
        &format!("/admin/suggestions/{good}/publish"),
        &[("subject_id", subject_id.as_str()), ("exam_type", "final")],
    )
    .await;
    assert_eq!(content::count_questions(&app.pool).await.unwrap(), 1);

    let response = app
        .post_form(&format!("/admin/suggestions/{spam}/reject"), &[])
        .await;
    assert_eq!(location(&response), "/admin");

    let remaining = moderation::list_suggestions(&app.pool).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, good);
    assert_eq!(remaining[0].status, SuggestionStatus::Published);
}

#[tokio::test]
async fn deleting_a_subject_removes_its_questions() {
    let app = spawn_app().await;
    let question_id = seed_question(&app.pool).await;
    let subject_id = content::find_question(&app.pool, question_id)
        .await
        .unwrap()
        .unwrap()
        .subject_id;
    app.login_admin().await;

    app.post_form(&format!("/questions/{question_id}/answer"), &[("choice", "A")])
        .await;
    assert_eq!(app.attempt_count().await, 1);

    let response = app
        .post_form(&format!("/admin/subjects/{subject_id}/delete"), &[])
        .await;
    assert_eq!(location(&response), "/admin");
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Subject deleted."));

    assert!(content::find_subject(&app.pool, subject_id).await.unwrap().is_none());
    assert!(content::find_question(&app.pool, question_id).await.unwrap().is_none());
    assert_eq!(app.attempt_count().await, 0);

    let response = app
        .post_form(&format!("/admin/subjects/{subject_id}/delete"), &[])
        .await;
    assert_eq!(location(&response), "/admin");
    let page = app.get("/admin").await.text().await.unwrap();
    assert!(page.contains("Subject not found."));
}
