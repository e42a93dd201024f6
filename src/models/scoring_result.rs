// src/models/scoring_result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    error::AppError,
    models::{common::PageRequest, user::UserVO},
};

/// Represents the 'scoring_results' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScoringResult {
    pub id: i64,
    pub result_name: String,
    pub result_desc: Option<String>,
    pub result_picture: Option<String>,

    /// Result property tags, stored as a JSON array string.
    pub result_prop: String,

    /// Minimum score that lands on this result.
    pub result_score_range: Option<i32>,
    pub app_id: i64,

    /// Owner.
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Column values produced from an add/update/edit request.
/// `None` leaves the column untouched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringResultRecord {
    pub result_name: Option<String>,
    pub result_desc: Option<String>,
    pub result_picture: Option<String>,
    pub result_prop: Option<String>,
    pub result_score_range: Option<i32>,
    pub app_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Serializes the tag list into the payload column.
pub fn encode_result_prop(tags: &[String]) -> Result<String, AppError> {
    serde_json::to_string(tags).map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Decodes the payload column back into tags.
pub fn decode_result_prop(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ScoringResultAddRequest {
    #[validate(length(max = 128))]
    pub result_name: Option<String>,
    #[validate(length(max = 1024))]
    pub result_desc: Option<String>,
    #[validate(length(max = 1024), custom(function = crate::models::validate_url))]
    pub result_picture: Option<String>,
    pub result_prop: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub result_score_range: Option<i32>,
    #[validate(range(min = 1))]
    pub app_id: Option<i64>,
}

impl TryFrom<ScoringResultAddRequest> for ScoringResultRecord {
    type Error = AppError;

    fn try_from(req: ScoringResultAddRequest) -> Result<Self, Self::Error> {
        // A new record always carries a payload, even when no tags were sent.
        let result_prop = encode_result_prop(req.result_prop.as_deref().unwrap_or_default())?;

        Ok(Self {
            result_name: req.result_name,
            result_desc: req.result_desc,
            result_picture: req.result_picture,
            result_prop: Some(result_prop),
            result_score_range: req.result_score_range,
            app_id: req.app_id,
            user_id: None,
        })
    }
}

/// Admin update. May reassign the owner.
#[derive(Debug, Deserialize, Validate)]
pub struct ScoringResultUpdateRequest {
    pub id: Option<i64>,
    #[validate(length(max = 128))]
    pub result_name: Option<String>,
    #[validate(length(max = 1024))]
    pub result_desc: Option<String>,
    #[validate(length(max = 1024), custom(function = crate::models::validate_url))]
    pub result_picture: Option<String>,
    pub result_prop: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub result_score_range: Option<i32>,
    #[validate(range(min = 1))]
    pub user_id: Option<i64>,
}

impl TryFrom<ScoringResultUpdateRequest> for ScoringResultRecord {
    type Error = AppError;

    fn try_from(req: ScoringResultUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            result_name: req.result_name,
            result_desc: req.result_desc,
            result_picture: req.result_picture,
            result_prop: req.result_prop.as_deref().map(encode_result_prop).transpose()?,
            result_score_range: req.result_score_range,
            app_id: None,
            user_id: req.user_id,
        })
    }
}

/// Self-service edit by the owner (or an admin).
#[derive(Debug, Deserialize, Validate)]
pub struct ScoringResultEditRequest {
    pub id: Option<i64>,
    #[validate(length(max = 128))]
    pub result_name: Option<String>,
    #[validate(length(max = 1024))]
    pub result_desc: Option<String>,
    #[validate(length(max = 1024), custom(function = crate::models::validate_url))]
    pub result_picture: Option<String>,
    pub result_prop: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub result_score_range: Option<i32>,
}

impl TryFrom<ScoringResultEditRequest> for ScoringResultRecord {
    type Error = AppError;

    fn try_from(req: ScoringResultEditRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            result_name: req.result_name,
            result_desc: req.result_desc,
            result_picture: req.result_picture,
            result_prop: req.result_prop.as_deref().map(encode_result_prop).transpose()?,
            result_score_range: req.result_score_range,
            app_id: None,
            user_id: None,
        })
    }
}

/// Filters for the paged listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringResultQueryRequest {
    #[serde(flatten)]
    pub page: PageRequest,
    pub id: Option<i64>,
    pub not_id: Option<i64>,

    /// Substring of the name or the description.
    pub search_text: Option<String>,
    pub result_name: Option<String>,
    pub result_desc: Option<String>,

    /// Every listed tag must be present.
    pub result_prop: Option<Vec<String>>,
    pub result_score_range: Option<i32>,
    pub app_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Scoring result as returned to callers, with decoded tags and creator summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResultVO {
    pub id: i64,
    pub result_name: String,
    pub result_desc: Option<String>,
    pub result_picture: Option<String>,
    pub result_prop: Vec<String>,
    pub result_score_range: Option<i32>,
    pub app_id: i64,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub user: Option<UserVO>,
}

impl TryFrom<ScoringResult> for ScoringResultVO {
    type Error = AppError;

    fn try_from(entity: ScoringResult) -> Result<Self, Self::Error> {
        let result_prop = decode_result_prop(&entity.result_prop).map_err(|e| {
            AppError::MalformedPayload(format!(
                "scoring_results.result_prop of id {}: {}",
                entity.id, e
            ))
        })?;

        Ok(Self {
            id: entity.id,
            result_name: entity.result_name,
            result_desc: entity.result_desc,
            result_picture: entity.result_picture,
            result_prop,
            result_score_range: entity.result_score_range,
            app_id: entity.app_id,
            user_id: entity.user_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            user: None,
        })
    }
}
