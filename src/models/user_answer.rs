// src/models/user_answer.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    error::AppError,
    models::{common::PageRequest, user::UserVO},
};

/// Represents the 'user_answers' table in the database.
/// One row per completed quiz attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub app_id: i64,

    /// Chosen option keys, stored as a JSON array string.
    pub choices: String,

    /// Scoring result the attempt landed on, copied at answer time.
    pub result_id: Option<i64>,
    pub result_name: Option<String>,
    pub result_desc: Option<String>,
    pub result_picture: Option<String>,
    pub result_score: Option<i32>,

    /// The user who answered.
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub fn encode_choices(choices: &[String]) -> Result<String, AppError> {
    serde_json::to_string(choices).map_err(|e| AppError::InternalServerError(e.to_string()))
}

pub fn decode_choices(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Column values produced from an add request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAnswerRecord {
    pub app_id: Option<i64>,
    pub choices: Option<String>,
    pub result_id: Option<i64>,
    pub result_score: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserAnswerAddRequest {
    #[validate(range(min = 1))]
    pub app_id: Option<i64>,
    #[validate(length(max = 200))]
    pub choices: Option<Vec<String>>,
    #[validate(range(min = 1))]
    pub result_id: Option<i64>,
    #[validate(range(min = 0))]
    pub result_score: Option<i32>,
}

impl TryFrom<UserAnswerAddRequest> for UserAnswerRecord {
    type Error = AppError;

    fn try_from(req: UserAnswerAddRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            app_id: req.app_id,
            choices: req.choices.as_deref().map(encode_choices).transpose()?,
            result_id: req.result_id,
            result_score: req.result_score,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserAnswerQueryRequest {
    #[serde(flatten)]
    pub page: PageRequest,
    pub id: Option<i64>,
    pub not_id: Option<i64>,
    pub app_id: Option<i64>,
    pub result_id: Option<i64>,

    /// Substring of the recorded result name.
    pub result_name: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswerVO {
    pub id: i64,
    pub app_id: i64,
    pub choices: Vec<String>,
    pub result_id: Option<i64>,
    pub result_name: Option<String>,
    pub result_desc: Option<String>,
    pub result_picture: Option<String>,
    pub result_score: Option<i32>,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub user: Option<UserVO>,
}

impl TryFrom<UserAnswer> for UserAnswerVO {
    type Error = AppError;

    fn try_from(entity: UserAnswer) -> Result<Self, Self::Error> {
        let choices = decode_choices(&entity.choices).map_err(|e| {
            AppError::MalformedPayload(format!("user_answers.choices of id {}: {}", entity.id, e))
        })?;

        Ok(Self {
            id: entity.id,
            app_id: entity.app_id,
            choices,
            result_id: entity.result_id,
            result_name: entity.result_name,
            result_desc: entity.result_desc,
            result_picture: entity.result_picture,
            result_score: entity.result_score,
            user_id: entity.user_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            user: None,
        })
    }
}
