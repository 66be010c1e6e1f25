use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    extractors::AppJson,
    middlewares::auth::{JwtClaims, JwtService},
    models::problem::{GenerateProblemRequest, ProblemPayload},
    services::{
        auth_service::AuthService, problem_generator, problem_service::ProblemService, AppState,
    },
};

/// Operation served when the request does not name one
const DEFAULT_OPERATION: &str = "addition";

/// POST /api/v1/problems - Generate a new problem for the current user
pub async fn generate_problem(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(req): AppJson<GenerateProblemRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid token subject".to_string()))?;

    // Difficulty defaults to the band matching the user's stored level
    let difficulty = match req.difficulty {
        Some(difficulty) => difficulty,
        None => {
            let jwt_service = JwtService::new(&state.config.jwt_secret);
            let auth = AuthService::new(state.db.clone(), jwt_service);
            let user = auth.get_user_by_id(user_id).await.map_err(|e| {
                tracing::error!("Failed to load user {}: {}", user_id, e);
                let msg = e.to_string();
                if msg.contains("User not found") {
                    (StatusCode::NOT_FOUND, msg)
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, msg)
                }
            })?;
            user.level.default_difficulty().as_str().to_string()
        }
    };

    let operation = req
        .operation
        .unwrap_or_else(|| DEFAULT_OPERATION.to_string());

    let generated = problem_generator::generate(&operation, &difficulty)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let service = ProblemService::new(state.db.clone());

    match service.create(generated).await {
        Ok(problem) => Ok((StatusCode::CREATED, Json(ProblemPayload::from(problem)))),
        Err(e) => {
            tracing::error!("Failed to store problem: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /api/v1/problems/{id} - Fetch a stored problem
pub async fn get_problem(
    State(state): State<Arc<AppState>>,
    Path(problem_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = ProblemService::new(state.db.clone());

    match service.get_by_id(problem_id).await {
        Ok(problem) => Ok(Json(ProblemPayload::from(problem))),
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("Problem not found") {
                Err((StatusCode::NOT_FOUND, msg))
            } else {
                tracing::error!("Failed to load problem {}: {}", problem_id, msg);
                Err((StatusCode::INTERNAL_SERVER_ERROR, msg))
            }
        }
    }
}
