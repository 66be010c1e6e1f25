use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Arithmetic operation a problem exercises
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Parses the wire name of an operation. Names are lowercase and exact.
    pub fn parse(s: &str) -> Option<Operation> {
        match s {
            "addition" => Some(Operation::Addition),
            "subtraction" => Some(Operation::Subtraction),
            "multiplication" => Some(Operation::Multiplication),
            "division" => Some(Operation::Division),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    /// Computes the answer for the given operands.
    pub fn apply(self, operand1: i64, operand2: i64) -> f64 {
        match self {
            Operation::Addition => (operand1 + operand2) as f64,
            Operation::Subtraction => (operand1 - operand2) as f64,
            Operation::Multiplication => (operand1 * operand2) as f64,
            Operation::Division => operand1 as f64 / operand2 as f64,
        }
    }
}

/// Difficulty band a problem is drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses the wire name of a difficulty. Names are lowercase and exact.
    pub fn parse(s: &str) -> Option<Difficulty> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Inclusive range operands are drawn from at this difficulty.
    pub fn operand_range(self) -> RangeInclusive<i64> {
        match self {
            Difficulty::Easy => 1..=10,
            Difficulty::Medium => 10..=50,
            Difficulty::Hard => 50..=100,
        }
    }
}

/// Problem row from the "problems" table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Problem {
    pub id: i64,
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operand1: i64,
    pub operand2: i64,
    pub answer: f64,
    pub created_at: DateTime<Utc>,
}

/// Problem returned to client. The answer stays server-side so the
/// client cannot read it off the payload before submitting.
#[derive(Debug, Serialize)]
pub struct ProblemPayload {
    pub id: i64,
    pub operation: Operation,
    pub difficulty: Difficulty,
    pub operand1: i64,
    pub operand2: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Problem> for ProblemPayload {
    fn from(problem: Problem) -> Self {
        ProblemPayload {
            id: problem.id,
            operation: problem.operation,
            difficulty: problem.difficulty,
            operand1: problem.operand1,
            operand2: problem.operand2,
            created_at: problem.created_at,
        }
    }
}

/// Request to generate a new problem. Both fields are optional:
/// operation falls back to addition, difficulty to the user's level.
#[derive(Debug, Deserialize)]
pub struct GenerateProblemRequest {
    pub operation: Option<String>,
    pub difficulty: Option<String>,
}
