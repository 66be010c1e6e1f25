use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    middlewares::auth::{JwtClaims, JwtService},
    models::user::{UpdateProfileRequest, UserProfile},
    services::{auth_service::AuthService, AppState},
};

/// GET /api/v1/users/me - Profile of the authenticated user
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    let jwt_service = JwtService::new(&state.config.jwt_secret);
    let service = AuthService::new(state.db.clone(), jwt_service);

    match service.get_user_by_id(user_id).await {
        Ok(user) => Ok(Json(UserProfile::from(user))),
        Err(e) => {
            tracing::error!("Failed to load profile: {}", e);
            let msg = e.to_string();
            if msg.contains("User not found") {
                Err((StatusCode::NOT_FOUND, msg))
            } else {
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        }
    }
}

/// PUT /api/v1/users/me - Update the authenticated user's profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    let jwt_service = JwtService::new(&state.config.jwt_secret);
    let service = AuthService::new(state.db.clone(), jwt_service);

    let result = match req.level {
        Some(level) => {
            tracing::info!(user_id = user_id, level = level.as_str(), "Updating user level");
            service.update_level(user_id, level).await
        }
        // Nothing to change, echo the current profile
        None => service.get_user_by_id(user_id).await,
    };

    match result {
        Ok(user) => Ok(Json(UserProfile::from(user))),
        Err(e) => {
            tracing::error!("Failed to update profile: {}", e);
            let msg = e.to_string();
            if msg.contains("User not found") {
                Err((StatusCode::NOT_FOUND, msg))
            } else {
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        }
    }
}
