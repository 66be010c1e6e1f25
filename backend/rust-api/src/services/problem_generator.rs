use rand::Rng;
use thiserror::Error;

use crate::models::problem::{Difficulty, Operation};

/// Upper bound on redraws when hunting for an even divisor. Past this
/// the divisor falls back to 1, which divides every dividend.
const MAX_DIVISOR_REDRAWS: u32 = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),
}

/// A freshly generated problem, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProblem {
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operand1: i64,
    pub operand2: i64,
    pub answer: f64,
}

/// Generates a random problem for the named operation and difficulty.
/// Unknown names are rejected, never defaulted.
pub fn generate(operation: &str, difficulty: &str) -> Result<GeneratedProblem, GenerateError> {
    let operation = Operation::parse(operation)
        .ok_or_else(|| GenerateError::InvalidOperation(operation.to_string()))?;
    let difficulty = Difficulty::parse(difficulty)
        .ok_or_else(|| GenerateError::InvalidDifficulty(difficulty.to_string()))?;

    Ok(generate_with(&mut rand::rng(), operation, difficulty))
}

fn generate_with<R: Rng>(
    rng: &mut R,
    operation: Operation,
    difficulty: Difficulty,
) -> GeneratedProblem {
    let range = difficulty.operand_range();
    let a = rng.random_range(range.clone());
    let b = rng.random_range(range.clone());

    let (operand1, operand2) = match operation {
        Operation::Addition | Operation::Multiplication => (a, b),
        // Larger operand first keeps the result non-negative
        Operation::Subtraction => (a.max(b), a.min(b)),
        // A band draw that already divides evenly is kept as-is
        Operation::Division if a % b == 0 => (a, b),
        Operation::Division => (a, draw_divisor(rng, a, *range.end())),
    };

    GeneratedProblem {
        operation,
        difficulty,
        operand1,
        operand2,
        answer: operation.apply(operand1, operand2),
    }
}

/// Draws a divisor of `dividend` from [1, max], redrawing on misses.
fn draw_divisor<R: Rng>(rng: &mut R, dividend: i64, max: i64) -> i64 {
    for _ in 0..MAX_DIVISOR_REDRAWS {
        let candidate = rng.random_range(1..=max);
        if dividend % candidate == 0 {
            return candidate;
        }
    }
    1
}
