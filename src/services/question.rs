// src/services/question.rs

use std::collections::HashSet;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    models::{
        common::Page,
        question::{Question, QuestionQueryRequest, QuestionRecord, QuestionVO, decode_question_content},
    },
    services::{self, attach_creators},
};

const COLUMNS: &str = "id, question_content, app_id, user_id, created_at, updated_at";

const SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("app_id", "app_id"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

const MAX_TITLE_LEN: usize = 512;
const MAX_OPTIONS: usize = 26;
const MAX_KEY_LEN: usize = 16;
const MAX_VALUE_LEN: usize = 512;

/// Business-rule validation. `add` makes content and app mandatory.
pub fn validate(record: &QuestionRecord, add: bool) -> Result<(), AppError> {
    if add {
        if record.question_content.is_none() {
            return Err(AppError::BadRequest("question_content is required".to_string()));
        }
        if record.app_id.is_none() {
            return Err(AppError::BadRequest("app_id is required".to_string()));
        }
    }

    if let Some(app_id) = record.app_id {
        if app_id <= 0 {
            return Err(AppError::BadRequest("app_id must be positive".to_string()));
        }
    }

    let Some(raw) = &record.question_content else {
        return Ok(());
    };

    let content = decode_question_content(raw)
        .map_err(|e| AppError::BadRequest(format!("question_content is malformed: {}", e)))?;

    if content.title.trim().is_empty() {
        return Err(AppError::BadRequest("Question title must not be blank".to_string()));
    }
    if content.title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest("Question title is too long".to_string()));
    }
    if content.options.is_empty() {
        return Err(AppError::BadRequest("A question needs at least one option".to_string()));
    }
    if content.options.len() > MAX_OPTIONS {
        return Err(AppError::BadRequest(format!(
            "A question has at most {} options",
            MAX_OPTIONS
        )));
    }

    let mut keys = HashSet::new();
    for option in &content.options {
        let key = option.key.trim();
        if key.is_empty() || key.chars().count() > MAX_KEY_LEN {
            return Err(AppError::BadRequest("Option keys must be short and non-blank".to_string()));
        }
        if !keys.insert(key) {
            return Err(AppError::BadRequest(format!("Duplicate option key '{}'", key)));
        }
        if option.value.chars().count() > MAX_VALUE_LEN {
            return Err(AppError::BadRequest(format!("Option '{}' is too long", key)));
        }
    }

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Question>, AppError> {
    let entity = sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(entity)
}

pub async fn insert(pool: &SqlitePool, record: QuestionRecord, owner_id: i64) -> Result<i64, AppError> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO questions (question_content, app_id, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.question_content)
    .bind(record.app_id)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    Ok(result.last_insert_rowid())
}

pub async fn update_by_id(pool: &SqlitePool, id: i64, record: QuestionRecord) -> Result<bool, AppError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    separated.push("updated_at = ");
    separated.push_bind_unseparated(chrono::Utc::now());

    if let Some(question_content) = record.question_content {
        separated.push("question_content = ");
        separated.push_bind_unseparated(question_content);
    }

    if let Some(app_id) = record.app_id {
        separated.push("app_id = ");
        separated.push_bind_unseparated(app_id);
    }

    if let Some(user_id) = record.user_id {
        separated.push("user_id = ");
        separated.push_bind_unseparated(user_id);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND deleted_at IS NULL");

    let result = builder.build().execute(pool).await.map_err(|e| {
        tracing::error!("Failed to update question {}: {:?}", id, e);
        AppError::from(e)
    })?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE questions SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question {}: {:?}", id, e);
            AppError::from(e)
        })?;

    Ok(result.rows_affected() > 0)
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &QuestionQueryRequest) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(id) = query.id {
        builder.push(" AND id = ").push_bind(id);
    }
    if let Some(not_id) = query.not_id {
        builder.push(" AND id != ").push_bind(not_id);
    }
    if let Some(text) = query
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        builder
            .push(" AND instr(question_content, ")
            .push_bind(text.to_string())
            .push(") > 0");
    }
    if let Some(app_id) = query.app_id {
        builder.push(" AND app_id = ").push_bind(app_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
}

pub async fn page(pool: &SqlitePool, query: &QuestionQueryRequest) -> Result<Page<Question>, AppError> {
    let order_by = query.page.order_by(SORT_FIELDS)?;

    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM questions");
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select: QueryBuilder<Sqlite> = QueryBuilder::new(format!("SELECT {COLUMNS} FROM questions"));
    push_filters(&mut select, query);
    select.push(" ORDER BY ").push(order_by);
    select.push(" LIMIT ").push_bind(query.page.page_size);
    select.push(" OFFSET ").push_bind(query.page.offset());

    let records: Vec<Question> = select.build_query_as().fetch_all(pool).await?;

    Ok(Page::new(records, total, &query.page))
}

pub async fn get_vo(pool: &SqlitePool, entity: Question) -> Result<QuestionVO, AppError> {
    let mut vo = QuestionVO::try_from(entity)?;
    vo.user = services::user::get_by_id(pool, vo.user_id).await?.map(Into::into);
    Ok(vo)
}

pub async fn get_vo_page(pool: &SqlitePool, page: Page<Question>) -> Result<Page<QuestionVO>, AppError> {
    let mut page = page.try_map(QuestionVO::try_from)?;
    attach_creators(pool, &mut page.records[..], |vo| vo.user_id, |vo, user| vo.user = user).await?;
    Ok(page)
}
