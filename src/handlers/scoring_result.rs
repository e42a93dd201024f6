// src/handlers/scoring_result.rs

use axum::extract::State;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        common::{ApiResult, DeleteRequest, IdQuery, MAX_PAGE_SIZE, Page, ok, require_id},
        scoring_result::{
            ScoringResult, ScoringResultAddRequest, ScoringResultEditRequest,
            ScoringResultQueryRequest, ScoringResultRecord, ScoringResultUpdateRequest,
            ScoringResultVO,
        },
        user::Role,
    },
    services::{self, scoring_result},
    utils::{
        access::{require_owner_or_admin, require_role},
        extract::{AppJson, AppQuery},
        jwt::Caller,
    },
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Scoring result {} not found", id))
}

/// Creates a scoring result owned by the caller.
/// Returns the new id.
pub async fn add_scoring_result(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<ScoringResultAddRequest>,
) -> ApiResult<i64> {
    payload.validate()?;
    let record = ScoringResultRecord::try_from(payload)?;
    scoring_result::validate(&record, true)?;

    let id = scoring_result::insert(&pool, record, caller.id).await?;
    tracing::info!(id, user_id = caller.id, "Scoring result created");

    ok(id)
}

/// Soft-deletes a scoring result.
/// Requires: Owner OR Admin.
pub async fn delete_scoring_result(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<DeleteRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;

    let existing = scoring_result::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, existing.user_id)?;

    if !scoring_result::delete_by_id(&pool, id).await? {
        return Err(AppError::OperationFailed(format!(
            "Soft delete of scoring result {} affected no rows",
            id
        )));
    }
    tracing::info!(id, user_id = caller.id, "Scoring result deleted");

    ok(true)
}

/// Updates any scoring result, including its owner.
/// Admin only.
pub async fn update_scoring_result(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<ScoringResultUpdateRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;
    require_role(&caller, Role::Admin)?;

    scoring_result::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    payload.validate()?;
    let record = ScoringResultRecord::try_from(payload)?;
    scoring_result::validate(&record, false)?;

    if let Some(owner_id) = record.user_id {
        if services::user::get_by_id(&pool, owner_id).await?.is_none() {
            return Err(AppError::BadRequest(format!("User {} does not exist", owner_id)));
        }
    }

    if !scoring_result::update_by_id(&pool, id, record).await? {
        return Err(AppError::OperationFailed(format!(
            "Update of scoring result {} affected no rows",
            id
        )));
    }
    tracing::info!(id, admin_id = caller.id, "Scoring result updated");

    ok(true)
}

/// Edits a scoring result.
/// Requires: Owner OR Admin.
pub async fn edit_scoring_result(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(payload): AppJson<ScoringResultEditRequest>,
) -> ApiResult<bool> {
    let id = require_id(payload.id)?;

    let existing = scoring_result::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    require_owner_or_admin(&caller, existing.user_id)?;

    payload.validate()?;
    let record = ScoringResultRecord::try_from(payload)?;
    scoring_result::validate(&record, false)?;

    if !scoring_result::update_by_id(&pool, id, record).await? {
        return Err(AppError::OperationFailed(format!(
            "Edit of scoring result {} affected no rows",
            id
        )));
    }
    tracing::info!(id, user_id = caller.id, "Scoring result edited");

    ok(true)
}

/// Gets one scoring result as a view.
pub async fn get_scoring_result_vo(
    State(pool): State<SqlitePool>,
    AppQuery(query): AppQuery<IdQuery>,
) -> ApiResult<ScoringResultVO> {
    let id = require_id(query.id)?;

    let entity = scoring_result::get_by_id(&pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    ok(scoring_result::get_vo(&pool, entity).await?)
}

/// Raw page of scoring results, without the page size ceiling.
/// Admin only.
pub async fn list_scoring_result_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(query): AppJson<ScoringResultQueryRequest>,
) -> ApiResult<Page<ScoringResult>> {
    require_role(&caller, Role::Admin)?;
    query.page.check(None)?;

    ok(scoring_result::page(&pool, &query).await?)
}

/// Public page of scoring result views.
pub async fn list_scoring_result_vo_by_page(
    State(pool): State<SqlitePool>,
    AppJson(query): AppJson<ScoringResultQueryRequest>,
) -> ApiResult<Page<ScoringResultVO>> {
    query.page.check(Some(MAX_PAGE_SIZE))?;

    let page = scoring_result::page(&pool, &query).await?;
    ok(scoring_result::get_vo_page(&pool, page).await?)
}

/// Page of the caller's own scoring results.
/// The owner filter is always the caller, whatever the request says.
pub async fn list_my_scoring_result_vo_by_page(
    State(pool): State<SqlitePool>,
    caller: Caller,
    AppJson(mut query): AppJson<ScoringResultQueryRequest>,
) -> ApiResult<Page<ScoringResultVO>> {
    query.user_id = Some(caller.id);
    query.page.check(Some(MAX_PAGE_SIZE))?;

    let page = scoring_result::page(&pool, &query).await?;
    ok(scoring_result::get_vo_page(&pool, page).await?)
}
