use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::problem::Difficulty;

/// User account row from the "users" table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub level: UserLevel,
    pub created_at: DateTime<Utc>,
}

/// Proficiency level tracked per user. Distinct from [`Difficulty`]:
/// levels describe the learner, difficulties describe a problem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum UserLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl UserLevel {
    pub fn as_str(&self) -> &str {
        match self {
            UserLevel::Beginner => "beginner",
            UserLevel::Intermediate => "intermediate",
            UserLevel::Advanced => "advanced",
        }
    }

    /// Next level up, saturating at the top.
    pub fn promote(self) -> UserLevel {
        match self {
            UserLevel::Beginner => UserLevel::Intermediate,
            UserLevel::Intermediate => UserLevel::Advanced,
            UserLevel::Advanced => UserLevel::Advanced,
        }
    }

    /// Next level down, saturating at the bottom.
    pub fn demote(self) -> UserLevel {
        match self {
            UserLevel::Advanced => UserLevel::Intermediate,
            UserLevel::Intermediate => UserLevel::Beginner,
            UserLevel::Beginner => UserLevel::Beginner,
        }
    }

    /// Problem difficulty served to a user of this level when the
    /// request does not name one explicitly.
    pub fn default_difficulty(self) -> Difficulty {
        match self {
            UserLevel::Beginner => Difficulty::Easy,
            UserLevel::Intermediate => Difficulty::Medium,
            UserLevel::Advanced => Difficulty::Hard,
        }
    }
}

/// User profile returned to client (without sensitive data)
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub level: UserLevel,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            level: user.level,
            created_at: user.created_at,
        }
    }
}

/// Request to register a new user
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 80,
        message = "Username must be between 3 and 80 characters"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request to login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub password: String,
}

/// Response after successful login or registration
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserProfile,
}

/// Request to update the authenticated user's profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub level: Option<UserLevel>,
}
