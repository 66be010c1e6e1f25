use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    middlewares::auth::JwtService,
    models::user::{LoginRequest, RegisterRequest},
    services::{auth_service::AuthService, AppState},
};

/// POST /api/v1/auth/register - Register a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, format!("Validation error: {}", e)));
    }

    tracing::info!("Registering new user: {}", req.username);

    let jwt_service = JwtService::new(&state.config.jwt_secret);
    let service = AuthService::new(state.db.clone(), jwt_service);

    match service.register(req).await {
        Ok(response) => {
            tracing::info!(user_id = response.user.id, "User registered successfully");
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            tracing::error!("Failed to register user: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

/// POST /api/v1/auth/login - Login with username and password
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, format!("Validation error: {}", e)));
    }

    tracing::info!("Login attempt for user: {}", req.username);

    let jwt_service = JwtService::new(&state.config.jwt_secret);
    let service = AuthService::new(state.db.clone(), jwt_service);

    match service.login(req).await {
        Ok(response) => {
            tracing::info!("User logged in successfully");
            Ok((StatusCode::OK, Json(response)))
        }
        Err(e) => {
            tracing::warn!("Failed login: {}", e);
            Err((StatusCode::UNAUTHORIZED, e.to_string()))
        }
    }
}
