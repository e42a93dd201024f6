// src/services/user_answer.rs

//! Answer history: validation, persistence and view assembly.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    models::{
        common::Page,
        scoring_result::ScoringResult,
        user_answer::{
            UserAnswer, UserAnswerQueryRequest, UserAnswerRecord, UserAnswerVO, decode_choices,
        },
    },
    services::{self, attach_creators},
};

const COLUMNS: &str = "id, app_id, choices, result_id, result_name, result_desc, result_picture, \
                       result_score, user_id, created_at, updated_at";

const SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("app_id", "app_id"),
    ("result_score", "result_score"),
    ("created_at", "created_at"),
];

const MAX_CHOICE_LEN: usize = 64;

/// An answer needs an app and at least one non-blank choice.
pub fn validate(record: &UserAnswerRecord) -> Result<(), AppError> {
    match record.app_id {
        None => return Err(AppError::BadRequest("app_id is required".to_string())),
        Some(app_id) if app_id <= 0 => {
            return Err(AppError::BadRequest("app_id must be positive".to_string()));
        }
        Some(_) => {}
    }

    let raw = record
        .choices
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("choices is required".to_string()))?;
    let choices = decode_choices(raw)
        .map_err(|e| AppError::BadRequest(format!("choices is not a list: {}", e)))?;

    if choices.is_empty() {
        return Err(AppError::BadRequest("choices must not be empty".to_string()));
    }
    if choices
        .iter()
        .any(|choice| choice.trim().is_empty() || choice.chars().count() > MAX_CHOICE_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "choices must be non-blank and at most {} characters",
            MAX_CHOICE_LEN
        )));
    }

    Ok(())
}

/// Looks up the live scoring result an answer refers to. It must belong to the same app.
pub async fn resolve_result(
    pool: &SqlitePool,
    record: &UserAnswerRecord,
) -> Result<Option<ScoringResult>, AppError> {
    let Some(result_id) = record.result_id else {
        return Ok(None);
    };

    let result = services::scoring_result::get_by_id(pool, result_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Scoring result {} does not exist", result_id)))?;

    if Some(result.app_id) != record.app_id {
        return Err(AppError::BadRequest(format!(
            "Scoring result {} belongs to another app",
            result_id
        )));
    }

    Ok(Some(result))
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserAnswer>, AppError> {
    let entity = sqlx::query_as::<_, UserAnswer>(&format!(
        "SELECT {COLUMNS} FROM user_answers WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(entity)
}

/// Inserts a validated answer for `owner_id`, copying the display fields of `result`.
pub async fn insert(
    pool: &SqlitePool,
    record: UserAnswerRecord,
    result: Option<&ScoringResult>,
    owner_id: i64,
) -> Result<i64, AppError> {
    let now = chrono::Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_answers
        (app_id, choices, result_id, result_name, result_desc, result_picture, result_score,
         user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.app_id)
    .bind(record.choices.unwrap_or_else(|| "[]".to_string()))
    .bind(result.map(|r| r.id))
    .bind(result.map(|r| r.result_name.clone()))
    .bind(result.and_then(|r| r.result_desc.clone()))
    .bind(result.and_then(|r| r.result_picture.clone()))
    .bind(record.result_score)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record user answer: {:?}", e);
        AppError::from(e)
    })?;

    Ok(inserted.last_insert_rowid())
}

/// Soft delete. Returns whether a live row was marked.
pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE user_answers SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user answer {}: {:?}", id, e);
            AppError::from(e)
        })?;

    Ok(result.rows_affected() > 0)
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &UserAnswerQueryRequest) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(id) = query.id {
        builder.push(" AND id = ").push_bind(id);
    }
    if let Some(not_id) = query.not_id {
        builder.push(" AND id != ").push_bind(not_id);
    }
    if let Some(app_id) = query.app_id {
        builder.push(" AND app_id = ").push_bind(app_id);
    }
    if let Some(result_id) = query.result_id {
        builder.push(" AND result_id = ").push_bind(result_id);
    }
    if let Some(name) = query
        .result_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        builder
            .push(" AND instr(COALESCE(result_name, ''), ")
            .push_bind(name.to_string())
            .push(") > 0");
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
}

pub async fn page(
    pool: &SqlitePool,
    query: &UserAnswerQueryRequest,
) -> Result<Page<UserAnswer>, AppError> {
    let order_by = query.page.order_by(SORT_FIELDS)?;

    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM user_answers");
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM user_answers"));
    push_filters(&mut select, query);
    select.push(" ORDER BY ").push(order_by);
    select.push(" LIMIT ").push_bind(query.page.page_size);
    select.push(" OFFSET ").push_bind(query.page.offset());

    let records: Vec<UserAnswer> = select.build_query_as().fetch_all(pool).await?;

    Ok(Page::new(records, total, &query.page))
}

pub async fn get_vo(pool: &SqlitePool, entity: UserAnswer) -> Result<UserAnswerVO, AppError> {
    let mut vo = UserAnswerVO::try_from(entity)?;
    vo.user = services::user::get_by_id(pool, vo.user_id).await?.map(Into::into);
    Ok(vo)
}

pub async fn get_vo_page(
    pool: &SqlitePool,
    page: Page<UserAnswer>,
) -> Result<Page<UserAnswerVO>, AppError> {
    let mut page = page.try_map(UserAnswerVO::try_from)?;
    attach_creators(pool, &mut page.records[..], |vo| vo.user_id, |vo, user| vo.user = user).await?;
    Ok(page)
}
