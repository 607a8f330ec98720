use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::auth::RegisterRequest,
    error::{AppError, AppResult},
    models::User,
    response::ApiResponse,
};

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    mobile: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            mobile: self.mobile,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

pub async fn register_user(pool: &DbPool, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        mobile,
        password,
    } = payload;

    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "mobile number must be exactly 10 digits".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user: UserRecord = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, mobile, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.as_str())
    .bind(mobile.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    ).await;

    Ok(ApiResponse::success("User created", user.into_user(), None))
}

/// Check a login attempt. The failure message is identical for an unknown
/// email and a wrong password.
pub async fn verify_credentials(pool: &DbPool, email: &str, password: &str) -> AppResult<User> {
    let user: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            return Err(AppError::Unauthenticated(
                "Invalid email or password".to_string(),
            ));
        }
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthenticated(
            "Invalid email or password".to_string(),
        ));
    }

    Ok(user.into_user())
}

/// Profile lookup for the `me` endpoint. `None` when the session points at a
/// user that no longer resolves.
pub async fn fetch_profile(pool: &DbPool, user_id: Uuid) -> AppResult<Option<User>> {
    let user: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user.map(UserRecord::into_user))
}
