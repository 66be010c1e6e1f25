use anyhow::{anyhow, Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::middlewares::auth::{JwtClaims, JwtService};
use crate::models::user::{
    AuthResponse, LoginRequest, RegisterRequest, User, UserLevel, UserProfile,
};

pub struct AuthService {
    db: SqlitePool,
    jwt_service: JwtService,
    access_token_ttl_seconds: i64,
}

impl AuthService {
    pub fn new(db: SqlitePool, jwt_service: JwtService) -> Self {
        // Read TTL from env or use default
        let access_token_ttl_seconds = std::env::var("JWT_ACCESS_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(3600); // Default: 1 hour

        Self {
            db,
            jwt_service,
            access_token_ttl_seconds,
        }
    }

    /// Hash a password using bcrypt with cost 12
    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, DEFAULT_COST).context("Failed to hash password")
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).context("Failed to verify password")
    }

    /// Register a new user. New accounts always start at beginner level.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        // Check if username or email is already taken
        let username_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
                .bind(&req.username)
                .fetch_one(&self.db)
                .await
                .context("Failed to check existing username")?;

        if username_taken > 0 {
            return Err(anyhow!("Username already exists"));
        }

        let email_taken =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
                .bind(&req.email)
                .fetch_one(&self.db)
                .await
                .context("Failed to check existing email")?;

        if email_taken > 0 {
            return Err(anyhow!("Email already exists"));
        }

        // Hash password
        let password_hash = self.hash_password(&req.password)?;

        let now = Utc::now();
        let level = UserLevel::default();

        let insert_result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, level, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(level)
        .bind(now)
        .execute(&self.db)
        .await
        .context("Failed to insert user")?;

        let user = User {
            id: insert_result.last_insert_rowid(),
            username: req.username,
            email: req.email,
            password_hash,
            level,
            created_at: now,
        };

        // Registration signs the user in right away
        let access_token = self.generate_access_token(user.id)?;

        Ok(AuthResponse {
            access_token,
            user: UserProfile::from(user),
        })
    }

    /// Login user with username and password
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(&req.username)
            .fetch_optional(&self.db)
            .await
            .context("Failed to query user")?
            .ok_or_else(|| anyhow!("Invalid username or password"))?;

        // Verify password
        if !self.verify_password(&req.password, &user.password_hash)? {
            tracing::warn!(
                username = %req.username,
                "Failed login attempt: invalid password"
            );
            return Err(anyhow!("Invalid username or password"));
        }

        let access_token = self.generate_access_token(user.id)?;

        tracing::info!(user_id = user.id, username = %user.username, "Successful login");

        Ok(AuthResponse {
            access_token,
            user: UserProfile::from(user),
        })
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_ttl_seconds);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        self.jwt_service
            .generate_token(claims)
            .map_err(|e| anyhow!("Failed to generate token: {}", e))
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: i64) -> Result<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to query user")?
            .ok_or_else(|| anyhow!("User not found"))
    }

    /// Overwrite a user's level and return the updated row
    pub async fn update_level(&self, user_id: i64, level: UserLevel) -> Result<User> {
        sqlx::query("UPDATE users SET level = ? WHERE id = ?")
            .bind(level)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("Failed to update user level")?;

        self.get_user_by_id(user_id).await
    }
}
