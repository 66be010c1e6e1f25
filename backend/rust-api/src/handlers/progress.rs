use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::progress::SubmitAnswerRequest,
    services::{progress_service::ProgressService, AppState},
};

/// POST /api/v1/progress - Submit an answer for grading
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Validate request
    if let Err(e) = req.validate() {
        return Err((StatusCode::BAD_REQUEST, format!("Validation error: {}", e)));
    }

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    tracing::debug!(
        user_id = user_id,
        problem_id = req.problem_id,
        "Answer submitted"
    );

    let service = ProgressService::new(state.db.clone());

    match service.submit_answer(user_id, &req).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("not found") {
                Err((StatusCode::NOT_FOUND, msg))
            } else {
                tracing::error!("Failed to record submission: {}", e);
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        }
    }
}

/// GET /api/v1/progress/recent - Latest attempts of the current user, newest first
pub async fn recent_progress(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    let service = ProgressService::new(state.db.clone());

    match service.recent_attempts(user_id).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            tracing::error!("Failed to load progress history: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /api/v1/progress/stats - Aggregate statistics for the current user
pub async fn progress_stats(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    let service = ProgressService::new(state.db.clone());

    match service.stats(user_id).await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("User not found") {
                Err((StatusCode::NOT_FOUND, msg))
            } else {
                tracing::error!("Failed to compute stats: {}", e);
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        }
    }
}
