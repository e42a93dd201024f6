// src/services/scoring_result.rs

//! Validation, persistence and view assembly for scoring results.
//! Every write here assumes the caller has already been authorized.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::AppError,
    models::{
        common::Page,
        scoring_result::{
            ScoringResult, ScoringResultQueryRequest, ScoringResultRecord, ScoringResultVO,
            decode_result_prop,
        },
    },
    services::{self, attach_creators},
};

const COLUMNS: &str = "id, result_name, result_desc, result_picture, result_prop, \
                       result_score_range, app_id, user_id, created_at, updated_at";

/// Sortable fields, as `(public name, column)`.
const SORT_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("result_name", "result_name"),
    ("result_score_range", "result_score_range"),
    ("app_id", "app_id"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

const MAX_TAGS: usize = 50;
const MAX_TAG_LEN: usize = 64;

/// Business-rule validation. `add` makes the create-time fields mandatory.
pub fn validate(record: &ScoringResultRecord, add: bool) -> Result<(), AppError> {
    if add {
        if record.result_name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return Err(AppError::BadRequest("result_name is required".to_string()));
        }
        if record.app_id.is_none() {
            return Err(AppError::BadRequest("app_id is required".to_string()));
        }
    }

    if let Some(name) = &record.result_name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("result_name must not be blank".to_string()));
        }
        if name.chars().count() > 128 {
            return Err(AppError::BadRequest("result_name is too long".to_string()));
        }
    }

    if let Some(app_id) = record.app_id {
        if app_id <= 0 {
            return Err(AppError::BadRequest("app_id must be positive".to_string()));
        }
    }

    if let Some(raw) = &record.result_prop {
        let tags = decode_result_prop(raw)
            .map_err(|e| AppError::BadRequest(format!("result_prop is not a tag list: {}", e)))?;
        if tags.len() > MAX_TAGS {
            return Err(AppError::BadRequest(format!(
                "result_prop holds at most {} tags",
                MAX_TAGS
            )));
        }
        if tags
            .iter()
            .any(|tag| tag.trim().is_empty() || tag.chars().count() > MAX_TAG_LEN)
        {
            return Err(AppError::BadRequest(format!(
                "result_prop tags must be non-blank and at most {} characters",
                MAX_TAG_LEN
            )));
        }
    }

    Ok(())
}

pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ScoringResult>, AppError> {
    let entity = sqlx::query_as::<_, ScoringResult>(&format!(
        "SELECT {COLUMNS} FROM scoring_results WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(entity)
}

/// Inserts a validated record owned by `owner_id` and returns the new id.
pub async fn insert(
    pool: &SqlitePool,
    record: ScoringResultRecord,
    owner_id: i64,
) -> Result<i64, AppError> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO scoring_results
        (result_name, result_desc, result_picture, result_prop, result_score_range,
         app_id, user_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.result_name)
    .bind(record.result_desc)
    .bind(record.result_picture)
    .bind(record.result_prop.unwrap_or_else(|| "[]".to_string()))
    .bind(record.result_score_range)
    .bind(record.app_id)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create scoring result: {:?}", e);
        AppError::from(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Writes the present fields of `record`. Returns whether a live row was updated.
pub async fn update_by_id(
    pool: &SqlitePool,
    id: i64,
    record: ScoringResultRecord,
) -> Result<bool, AppError> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE scoring_results SET ");
    let mut separated = builder.separated(", ");

    separated.push("updated_at = ");
    separated.push_bind_unseparated(chrono::Utc::now());

    if let Some(result_name) = record.result_name {
        separated.push("result_name = ");
        separated.push_bind_unseparated(result_name);
    }

    if let Some(result_desc) = record.result_desc {
        separated.push("result_desc = ");
        separated.push_bind_unseparated(result_desc);
    }

    if let Some(result_picture) = record.result_picture {
        separated.push("result_picture = ");
        separated.push_bind_unseparated(result_picture);
    }

    if let Some(result_prop) = record.result_prop {
        separated.push("result_prop = ");
        separated.push_bind_unseparated(result_prop);
    }

    if let Some(result_score_range) = record.result_score_range {
        separated.push("result_score_range = ");
        separated.push_bind_unseparated(result_score_range);
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
        tracing::error!("Failed to update scoring result {}: {:?}", id, e);
        AppError::from(e)
    })?;

    Ok(result.rows_affected() > 0)
}

/// Soft delete. Returns whether a live row was marked.
pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE scoring_results SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(chrono::Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to delete scoring result {}: {:?}", id, e);
        AppError::from(e)
    })?;

    Ok(result.rows_affected() > 0)
}

/// Appends the WHERE clause for `query` onto `builder`.
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ScoringResultQueryRequest) {
    builder.push(" WHERE deleted_at IS NULL");

    if let Some(id) = query.id {
        builder.push(" AND id = ").push_bind(id);
    }
    if let Some(not_id) = query.not_id {
        builder.push(" AND id != ").push_bind(not_id);
    }
    if let Some(text) = non_blank(&query.search_text) {
        builder
            .push(" AND (instr(result_name, ")
            .push_bind(text.clone())
            .push(") > 0 OR instr(COALESCE(result_desc, ''), ")
            .push_bind(text)
            .push(") > 0)");
    }
    if let Some(name) = non_blank(&query.result_name) {
        builder.push(" AND instr(result_name, ").push_bind(name).push(") > 0");
    }
    if let Some(desc) = non_blank(&query.result_desc) {
        builder
            .push(" AND instr(COALESCE(result_desc, ''), ")
            .push_bind(desc)
            .push(") > 0");
    }
    if let Some(tags) = &query.result_prop {
        // Each tag must equal one element of the stored array. Undecodable payloads match nothing.
        for tag in tags {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM json_each(CASE WHEN json_valid(result_prop) \
                     THEN result_prop ELSE '[]' END) AS tag WHERE tag.value = ",
                )
                .push_bind(tag.clone())
                .push(")");
        }
    }
    if let Some(range) = query.result_score_range {
        builder.push(" AND result_score_range = ").push_bind(range);
    }
    if let Some(app_id) = query.app_id {
        builder.push(" AND app_id = ").push_bind(app_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One page of live entities matching `query`. Page bounds must already be checked.
pub async fn page(
    pool: &SqlitePool,
    query: &ScoringResultQueryRequest,
) -> Result<Page<ScoringResult>, AppError> {
    let order_by = query.page.order_by(SORT_FIELDS)?;

    let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM scoring_results");
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COLUMNS} FROM scoring_results"));
    push_filters(&mut select, query);
    select.push(" ORDER BY ").push(order_by);
    select.push(" LIMIT ").push_bind(query.page.page_size);
    select.push(" OFFSET ").push_bind(query.page.offset());

    let records: Vec<ScoringResult> = select.build_query_as().fetch_all(pool).await?;

    Ok(Page::new(records, total, &query.page))
}

/// Decodes one entity and attaches its creator.
pub async fn get_vo(pool: &SqlitePool, entity: ScoringResult) -> Result<ScoringResultVO, AppError> {
    let mut vo = ScoringResultVO::try_from(entity)?;
    vo.user = services::user::get_by_id(pool, vo.user_id).await?.map(Into::into);
    Ok(vo)
}

/// Decodes a page of entities and attaches creators with a single user lookup.
pub async fn get_vo_page(
    pool: &SqlitePool,
    page: Page<ScoringResult>,
) -> Result<Page<ScoringResultVO>, AppError> {
    let mut page = page.try_map(ScoringResultVO::try_from)?;
    attach_creators(pool, &mut page.records[..], |vo| vo.user_id, |vo, user| vo.user = user).await?;
    Ok(page)
}
