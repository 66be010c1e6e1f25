use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::UserLevel;

/// One graded attempt from the "progress" table
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProgressEntry {
    pub id: i64,
    pub user_id: i64,
    pub problem_id: i64,
    pub user_answer: f64,
    pub is_correct: bool,
    pub time_taken: Option<f64>,
    pub attempted_at: DateTime<Utc>,
}

/// Request to submit an answer for a stored problem
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub problem_id: i64,

    pub user_answer: f64,

    /// Seconds the client spent on the problem, if it measured them
    #[validate(range(min = 0.0, message = "time_taken must be non-negative"))]
    pub time_taken: Option<f64>,
}

/// Outcome of grading one submission
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub correct_answer: f64,
    pub new_level: UserLevel,
}

/// Aggregate statistics over a user's full attempt history
#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total_attempts: i64,
    pub correct_attempts: i64,
    pub success_rate: f64,
    pub current_level: UserLevel,
}
