use crate::config::Config;
use sqlx::SqlitePool;

pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self { config, db }
    }
}

pub mod adaptive;
pub mod auth_service;
pub mod problem_generator;
pub mod problem_service;
pub mod progress_service;
