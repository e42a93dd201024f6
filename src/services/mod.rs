// src/services/mod.rs

pub mod question;
pub mod scoring_result;
pub mod user;
pub mod user_answer;

use sqlx::SqlitePool;

use crate::{error::AppError, models::user::UserVO};

/// Fills the creator summary of each view from one batched user lookup.
pub async fn attach_creators<T, K, S>(
    pool: &SqlitePool,
    records: &mut [T],
    owner_of: K,
    set_creator: S,
) -> Result<(), AppError>
where
    K: Fn(&T) -> i64,
    S: Fn(&mut T, Option<UserVO>),
{
    let mut ids: Vec<i64> = records.iter().map(&owner_of).collect();
    ids.sort_unstable();
    ids.dedup();

    let creators = user::summaries(pool, &ids).await?;

    for record in records.iter_mut() {
        let creator = creators.get(&owner_of(record)).cloned();
        set_creator(record, creator);
    }

    Ok(())
}
