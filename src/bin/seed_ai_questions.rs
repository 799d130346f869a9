// src/bin/seed_ai_questions.rs
//
// Replaces the generated questions of the Python subject with the built-in set.

use dotenvy::dotenv;
use question_bank::{db, seed};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://app.db".to_string());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::new(rust_log))
        .with(fmt::layer().with_target(false))
        .init();

    let pool = db::connect(&database_url).await?;
    db::migrate(&pool).await?;

    let inserted = seed::seed_ai_questions(&pool).await?;
    println!(
        "Inserted {} AI questions for subject '{}'.",
        inserted,
        seed::SEED_SUBJECT
    );

    Ok(())
}
