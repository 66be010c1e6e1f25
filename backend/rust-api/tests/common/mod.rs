use axum::Router;
use mathtrainer_api::{config::Config, create_router, db, services::AppState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // Every test gets its own database file under the system temp dir,
    // so tests can run in parallel without seeing each other's rows
    let db_path = std::env::temp_dir().join(format!(
        "mathtrainer-test-{}-{}.db",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&db_path);

    let config = Config {
        database_url: format!("sqlite:{}", db_path.display()),
        jwt_secret: "test-secret".to_string(),
    };

    // Open pool and run migrations
    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open test database");

    let app_state = Arc::new(AppState::new(config, pool));

    // Build test router (same as main app)
    create_router(app_state)
}
