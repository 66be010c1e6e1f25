use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, LEVEL_CHANGES_TOTAL};
use crate::models::problem::Problem;
use crate::models::progress::{
    ProgressEntry, SubmitAnswerRequest, SubmitAnswerResponse, UserStats,
};
use crate::models::user::UserLevel;
use crate::services::adaptive;

/// Absolute tolerance when comparing a submitted answer to the stored one
pub const ANSWER_TOLERANCE: f64 = 0.01;

/// Most attempts a single history request will return
pub const HISTORY_LIMIT: i64 = 50;

pub struct ProgressService {
    db: SqlitePool,
}

impl ProgressService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Grade a submission, record it, and re-evaluate the user's level.
    /// The read-grade-write path runs inside one transaction so two
    /// concurrent submissions cannot interleave their level updates.
    pub async fn submit_answer(
        &self,
        user_id: i64,
        req: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse> {
        let mut tx = self
            .db
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let problem = sqlx::query_as::<_, Problem>("SELECT * FROM problems WHERE id = ?")
            .bind(req.problem_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to query problem")?
            .ok_or_else(|| anyhow!("Problem not found"))?;

        let is_correct = (req.user_answer - problem.answer).abs() < ANSWER_TOLERANCE;

        sqlx::query(
            "INSERT INTO progress (user_id, problem_id, user_answer, is_correct, time_taken, attempted_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(req.problem_id)
        .bind(req.user_answer)
        .bind(is_correct)
        .bind(req.time_taken)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .context("Failed to insert progress entry")?;

        let recent = sqlx::query_as::<_, ProgressEntry>(
            "SELECT * FROM progress WHERE user_id = ? \
             ORDER BY attempted_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(adaptive::RECENT_ATTEMPT_WINDOW as i64)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to query recent attempts")?;

        let rate = adaptive::success_rate(&recent, adaptive::RECENT_ATTEMPT_WINDOW);

        let current_level =
            sqlx::query_scalar::<_, UserLevel>("SELECT level FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to query user level")?
                .ok_or_else(|| anyhow!("User not found"))?;

        let new_level = adaptive::next_level(current_level, rate);

        if new_level != current_level {
            sqlx::query("UPDATE users SET level = ? WHERE id = ?")
                .bind(new_level)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .context("Failed to update user level")?;

            let direction = if rate >= adaptive::PROMOTE_THRESHOLD {
                "promoted"
            } else {
                "demoted"
            };
            LEVEL_CHANGES_TOTAL.with_label_values(&[direction]).inc();

            tracing::info!(
                user_id = user_id,
                from = current_level.as_str(),
                to = new_level.as_str(),
                success_rate = rate,
                "User level changed"
            );
        }

        tx.commit().await.context("Failed to commit submission")?;

        // Record answer submission metric
        let correct_label = if is_correct { "true" } else { "false" };
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[correct_label])
            .inc();

        Ok(SubmitAnswerResponse {
            is_correct,
            correct_answer: problem.answer,
            new_level,
        })
    }

    /// Newest attempts for a user, most recent first
    pub async fn recent_attempts(&self, user_id: i64) -> Result<Vec<ProgressEntry>> {
        sqlx::query_as::<_, ProgressEntry>(
            "SELECT * FROM progress WHERE user_id = ? \
             ORDER BY attempted_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.db)
        .await
        .context("Failed to query progress history")
    }

    /// Aggregate statistics over the user's entire history
    pub async fn stats(&self, user_id: i64) -> Result<UserStats> {
        let total_attempts =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM progress WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.db)
                .await
                .context("Failed to count attempts")?;

        let correct_attempts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM progress WHERE user_id = ? AND is_correct = 1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("Failed to count correct attempts")?;

        let current_level =
            sqlx::query_scalar::<_, UserLevel>("SELECT level FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await
                .context("Failed to query user level")?
                .ok_or_else(|| anyhow!("User not found"))?;

        let success_rate = if total_attempts > 0 {
            correct_attempts as f64 / total_attempts as f64
        } else {
            0.0
        };

        Ok(UserStats {
            total_attempts,
            correct_attempts,
            success_rate,
            current_level,
        })
    }
}
