// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{
    error::AppError,
    models::{common::PageRequest, user::UserVO},
};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// Structured content, stored as a JSON object string.
    pub question_content: String,

    pub app_id: i64,

    /// Owner.
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Decoded form of `question_content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub title: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option label, e.g. "A".
    pub key: String,
    pub value: String,

    /// Result tag this option votes for (tag-based scoring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Points this option is worth (score-based scoring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

pub fn encode_question_content(content: &QuestionContent) -> Result<String, AppError> {
    serde_json::to_string(content).map_err(|e| AppError::InternalServerError(e.to_string()))
}

pub fn decode_question_content(raw: &str) -> Result<QuestionContent, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Column values produced from an add/update/edit request.
/// `None` leaves the column untouched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionRecord {
    pub question_content: Option<String>,
    pub app_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionAddRequest {
    pub question_content: Option<QuestionContent>,
    #[validate(range(min = 1))]
    pub app_id: Option<i64>,
}

impl TryFrom<QuestionAddRequest> for QuestionRecord {
    type Error = AppError;

    fn try_from(req: QuestionAddRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            question_content: req
                .question_content
                .as_ref()
                .map(encode_question_content)
                .transpose()?,
            app_id: req.app_id,
            user_id: None,
        })
    }
}

/// Admin update. May reassign the owner.
#[derive(Debug, Deserialize, Validate)]
pub struct QuestionUpdateRequest {
    pub id: Option<i64>,
    pub question_content: Option<QuestionContent>,
    #[validate(range(min = 1))]
    pub user_id: Option<i64>,
}

impl TryFrom<QuestionUpdateRequest> for QuestionRecord {
    type Error = AppError;

    fn try_from(req: QuestionUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            question_content: req
                .question_content
                .as_ref()
                .map(encode_question_content)
                .transpose()?,
            app_id: None,
            user_id: req.user_id,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionEditRequest {
    pub id: Option<i64>,
    pub question_content: Option<QuestionContent>,
}

impl TryFrom<QuestionEditRequest> for QuestionRecord {
    type Error = AppError;

    fn try_from(req: QuestionEditRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            question_content: req
                .question_content
                .as_ref()
                .map(encode_question_content)
                .transpose()?,
            app_id: None,
            user_id: None,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionQueryRequest {
    #[serde(flatten)]
    pub page: PageRequest,
    pub id: Option<i64>,
    pub not_id: Option<i64>,

    /// Substring of the serialized content.
    pub search_text: Option<String>,
    pub app_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Question as returned to callers, with decoded content and creator summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionVO {
    pub id: i64,
    pub question_content: QuestionContent,
    pub app_id: i64,
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub user: Option<UserVO>,
}

impl TryFrom<Question> for QuestionVO {
    type Error = AppError;

    fn try_from(entity: Question) -> Result<Self, Self::Error> {
        let question_content = decode_question_content(&entity.question_content).map_err(|e| {
            AppError::MalformedPayload(format!(
                "questions.question_content of id {}: {}",
                entity.id, e
            ))
        })?;

        Ok(Self {
            id: entity.id,
            question_content,
            app_id: entity.app_id,
            user_id: entity.user_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            user: None,
        })
    }
}
