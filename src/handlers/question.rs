// src/handlers/question.rs

use axum::extract::State;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        common::{ApiResult, DeleteRequest, IdQuery, MAX_PAGE_SIZE, Page, ok, require_id},
        question::{
            Question, QuestionAddRequest, QuestionEditRequest, QuestionQueryRequest,
            QuestionRecord, QuestionUpdateRequest, QuestionVO,
        },
        user::Role,
    },
    services::{self, question},
    utils::{
        access::{require_owner_or_admin, require_role},
        extract::{AppJson, AppQuery},
        jwt::Caller,
    },
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Question {} not found", id))
}

/// Creates a question owned by the caller.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<QuestionAddRequest>,
) -> ApiResult<i64> {
    payload.validate()?;
    let record = QuestionRecord::try_from(payload)?;
    question::validate(&record, true)?;

    let id = question::insert(&pool, record, caller.id).await?;
    tracing::info!(id, user_id = caller.id, "Question created");

    ok(id)
}

/// Requires: Owner OR Admin.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<DeleteRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;

    let existing = question::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, existing.user_id)?;

    if !question::delete_by_id(&pool, id).await? {
        return Err(AppError::OperationFailed(format!(
            "Soft delete of question {} affected no rows",
            id
        )));
    }
    tracing::info!(id, user_id = caller.id, "Question deleted");

    ok(true)
}

/// Admin only.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<QuestionUpdateRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;
    require_role(&caller, Role::Admin)?;

    question::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    payload.validate()?;
    let record = QuestionRecord::try_from(payload)?;
    question::validate(&record, false)?;

    if let Some(owner_id) = record.user_id {
        if services::user::get_by_id(&pool, owner_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("User {} does not exist", owner_id)));
        }
    }

    if !question::update_by_id(&pool, id, record).await? {
        return Err(AppError::OperationFailed(format!(
            "Update of question {} affected no rows",
            id
        )));
    }
    tracing::info!(id, admin_id = caller.id, "Question updated");

    ok(true)
}

/// Requires: Owner OR Admin.
pub async fn edit_question(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<QuestionEditRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;

    let existing = question::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, existing.user_id)?;

    payload.validate()?;
    let record = QuestionRecord::try_from(payload)?;
    question::validate(&record, false)?;

    if !question::update_by_id(&pool, id, record).await? {
        return Err(AppError::OperationFailed(format!(
            "Edit of question {} affected no rows",
            id
        )));
    }
    tracing::info!(id, user_id = caller.id, "Question edited");

    ok(true)
}

pub async fn get_question_vo(
    State(pool): State<SqlitePool>,
    AppQuery(query): AppQuery<IdQuery>,
) -> ApiResult<QuestionVO> {
    let id = require_id(query.id)?;

    let entity = question::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    ok(question::get_vo(&pool, entity).await?)
}

/// Admin only. No page size ceiling.
pub async fn list_question_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(query): AppJson<QuestionQueryRequest>,
) -> ApiResult<Page<Question>> {
    require_role(&caller, Role::Admin)?;
    query.page.check(None)?;

    ok(question::page(&pool, &query).await?)
}

pub async fn list_question_vo_by_page(
    State(pool): State<SqlitePool>,
    AppJson(query): AppJson<QuestionQueryRequest>,
) -> ApiResult<Page<QuestionVO>> {
    query.page.check(Some(MAX_PAGE_SIZE))?;

    let page = question::page(&pool, &query).await?;
    ok(question::get_vo_page(&pool, page).await?)
}

pub async fn list_my_question_vo_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(mut query): AppJson<QuestionQueryRequest>,
) -> ApiResult<Page<QuestionVO>> {
    query.user_id = Some(caller.id);
    query.page.check(Some(MAX_PAGE_SIZE))?;

    let page = question::page(&pool, &query).await?;
    ok(question::get_vo_page(&pool, page).await?)
}
