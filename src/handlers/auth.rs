// src/handlers/auth.rs

use axum::extract::State;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        common::{ApiResult, ok},
        user::{LoginRequest, LoginResponse, RegisterRequest, Role, UserVO},
    },
    services,
    utils::{
        extract::AppJson,
        hash::{hash_password, verify_password},
        jwt::{Caller, sign_jwt},
    },
};

/// Registers a new user with the plain `user` role.
///
/// Hashes the password using Argon2 before storing it.
/// Returns the new user id.
pub async fn register(
    State(pool): State<SqlitePool>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> ApiResult<i64> {
    payload.check()?;

    let hashed_password = hash_password(&payload.password)?;
    let id = services::user::create(&pool, &payload.username, &hashed_password, Role::User).await?;
    tracing::info!(id, username = %payload.username, "User registered");

    ok(id)
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown user and wrong password produce the same error.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    payload.validate()?;

    let invalid = || AppError::BadRequest("Invalid username or password".to_string());

    let user = services::user::get_by_username(&pool, &payload.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let role: Role = user.role.parse()?;
    if role == Role::Ban {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }

    let token = sign_jwt(user.id, role, &config.jwt_secret, config.jwt_expiration)?;

    ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    })
}

/// Returns the caller's own summary.
pub async fn get_login_user(State(pool): State<SqlitePool>, caller: Caller) -> ApiResult<UserVO> {
    let user = services::user::get_by_id(&pool, caller.id)
        .await?
        .ok_or_else(|| AppError::NotLogin("User no longer exists".to_string()))?;

    ok(user.into())
}
