// src/handlers/user_answer.rs

use axum::extract::State;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        common::{ApiResult, DeleteRequest, IdQuery, MAX_PAGE_SIZE, Page, ok, require_id},
        user::Role,
        user_answer::{
            UserAnswer, UserAnswerAddRequest, UserAnswerQueryRequest, UserAnswerRecord,
            UserAnswerVO,
        },
    },
    services::user_answer,
    utils::{
        access::{require_owner_or_admin, require_role},
        extract::{AppJson, AppQuery},
        jwt::Caller,
    },
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User answer {} not found", id))
}

/// Records a quiz attempt for the caller.
/// Returns the new id.
pub async fn add_user_answer(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<UserAnswerAddRequest>,
) -> ApiResult<i64> {
    payload.validate()?;
    let record = UserAnswerRecord::try_from(payload)?;
    user_answer::validate(&record)?;

    let result = user_answer::resolve_result(&pool, &record).await?;
    let id = user_answer::insert(&pool, record, result.as_ref(), caller.id).await?;
    tracing::info!(id, user_id = caller.id, "User answer recorded");

    ok(id)
}

/// Soft-deletes an answer.
/// Requires: Owner OR Admin.
pub async fn delete_user_answer(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<DeleteRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;

    let existing = user_answer::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, existing.user_id)?;

    if !user_answer::delete_by_id(&pool, id).await? {
        return Err(AppError::OperationFailed(format!(
            "Soft delete of user answer {} affected no rows",
            id
        )));
    }
    tracing::info!(id, user_id = caller.id, "User answer deleted");

    ok(true)
}

/// Gets one answer as a view.
/// Answers are private: Owner OR Admin.
pub async fn get_user_answer_vo(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppQuery(query): AppQuery<IdQuery>,
) -> ApiResult<UserAnswerVO> {
    let id = require_id(query.id)?;

    let entity = user_answer::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, entity.user_id)?;

    ok(user_answer::get_vo(&pool, entity).await?)
}

/// Raw page of all answers.
/// Admin only.
pub async fn list_user_answer_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(query): AppJson<UserAnswerQueryRequest>,
) -> ApiResult<Page<UserAnswer>> {
    require_role(&caller, Role::Admin)?;
    query.page.check(None)?;

    ok(user_answer::page(&pool, &query).await?)
}

/// Page of the caller's own answers.
pub async fn list_my_user_answer_vo_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(mut query): AppJson<UserAnswerQueryRequest>,
) -> ApiResult<Page<UserAnswerVO>> {
    query.user_id = Some(caller.id);
    query.page.check(Some(MAX_PAGE_SIZE))?;

    let page = user_answer::page(&pool, &query).await?;
    ok(user_answer::get_vo_page(&pool, page).await?)
}
