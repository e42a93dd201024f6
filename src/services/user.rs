// src/services/user.rs

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    models::user::{Role, User, UserVO},
};

const COLUMNS: &str = "id, username, password, role, created_at";

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Inserts a user and returns the new id.
/// A taken username is reported as `BadRequest`.
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO users (username, password, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::BadRequest(format!("Username '{}' already exists", username));
            }
        }
        tracing::error!("Failed to create user: {:?}", e);
        AppError::from(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Creator summaries for a batch of owner ids, keyed by id.
/// Unknown ids are simply absent from the map.
pub async fn summaries(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, UserVO>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM users WHERE id IN ("));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let users: Vec<User> = builder.build_query_as().fetch_all(pool).await?;

    Ok(users
        .into_iter()
        .map(|user| (user.id, UserVO::from(user)))
        .collect())
}
