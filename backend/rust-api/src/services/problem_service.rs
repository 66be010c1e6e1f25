use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::metrics::PROBLEMS_GENERATED_TOTAL;
use crate::models::problem::Problem;
use crate::services::problem_generator::GeneratedProblem;

pub struct ProblemService {
    db: SqlitePool,
}

impl ProblemService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist a generated problem and return the stored row
    pub async fn create(&self, generated: GeneratedProblem) -> Result<Problem> {
        let created_at = Utc::now();

        let insert_result = sqlx::query(
            "INSERT INTO problems (operation, difficulty, operand1, operand2, answer, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(generated.operation)
        .bind(generated.difficulty)
        .bind(generated.operand1)
        .bind(generated.operand2)
        .bind(generated.answer)
        .bind(created_at)
        .execute(&self.db)
        .await
        .context("Failed to insert problem")?;

        let problem = Problem {
            id: insert_result.last_insert_rowid(),
            operation: generated.operation,
            difficulty: generated.difficulty,
            operand1: generated.operand1,
            operand2: generated.operand2,
            answer: generated.answer,
            created_at,
        };

        // Record business metrics
        PROBLEMS_GENERATED_TOTAL
            .with_label_values(&[problem.operation.as_str(), problem.difficulty.as_str()])
            .inc();

        tracing::info!(
            problem_id = problem.id,
            operation = problem.operation.as_str(),
            difficulty = problem.difficulty.as_str(),
            "Problem created"
        );

        Ok(problem)
    }

    /// Get problem by ID
    pub async fn get_by_id(&self, problem_id: i64) -> Result<Problem> {
        sqlx::query_as::<_, Problem>("SELECT * FROM problems WHERE id = ?")
            .bind(problem_id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to query problem")?
            .ok_or_else(|| anyhow!("Problem not found"))
    }
}
