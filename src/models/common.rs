// src/models/common.rs

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Largest page a caller-facing listing may request.
pub const MAX_PAGE_SIZE: i64 = 20;

/// Stable envelope codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    ParamsError,
    NotLoginError,
    NoAuthError,
    NotFoundError,
    SystemError,
    OperationError,
    MalformedPayloadError,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Success => 0,
            ErrorCode::ParamsError => 40000,
            ErrorCode::NotLoginError => 40100,
            ErrorCode::NoAuthError => 40101,
            ErrorCode::NotFoundError => 40400,
            ErrorCode::SystemError => 50000,
            ErrorCode::OperationError => 50001,
            ErrorCode::MalformedPayloadError => 50002,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "ok",
            ErrorCode::ParamsError => "Invalid request parameters",
            ErrorCode::NotLoginError => "Not logged in",
            ErrorCode::NoAuthError => "No permission",
            ErrorCode::NotFoundError => "Requested data does not exist",
            ErrorCode::SystemError => "Internal system error",
            ErrorCode::OperationError => "Operation failed",
            ErrorCode::MalformedPayloadError => "Stored data is corrupted",
        }
    }
}

/// Uniform response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    pub message: String,
}

impl<T> BaseResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            data: Some(data),
            message: ErrorCode::Success.message().to_string(),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            data: None,
            message: message.into(),
        }
    }
}

/// Handler return type: success envelope or an `AppError` rendered as the failure envelope.
pub type ApiResult<T> = Result<Json<BaseResponse<T>>, AppError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(BaseResponse::success(data)))
}

/// Body of every `/delete` endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: Option<i64>,
}

/// Query string of every `/get/vo` endpoint.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i64>,
}

/// Rejects absent or non-positive ids before anything else runs.
pub fn require_id(id: Option<i64>) -> Result<i64, AppError> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest("A positive id is required".to_string())),
    }
}

/// Paging and sorting fields, flattened into every query request.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_current")]
    pub current: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub sort_field: Option<String>,
    /// `ascend` sorts ascending; any other value sorts descending.
    pub sort_order: Option<String>,
}

fn default_current() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            current: default_current(),
            page_size: default_page_size(),
            sort_field: None,
            sort_order: None,
        }
    }
}

impl PageRequest {
    /// Checks page bounds. `max_size` is `None` on admin listings.
    pub fn check(&self, max_size: Option<i64>) -> Result<(), AppError> {
        if self.current < 1 {
            return Err(AppError::BadRequest("current must be at least 1".to_string()));
        }
        if self.page_size < 1 {
            return Err(AppError::BadRequest("page_size must be at least 1".to_string()));
        }
        if let Some(max) = max_size {
            if self.page_size > max {
                return Err(AppError::BadRequest(format!(
                    "page_size must not exceed {}",
                    max
                )));
            }
        }
        if (self.current - 1).checked_mul(self.page_size).is_none() {
            return Err(AppError::BadRequest("current is out of range".to_string()));
        }
        Ok(())
    }

    /// Row offset of the requested page. Saturates instead of wrapping.
    pub fn offset(&self) -> i64 {
        (self.current - 1).saturating_mul(self.page_size)
    }

    /// Resolves `sort_field` against a whitelist of `(public name, column)` pairs.
    /// Falls back to `id DESC` when no sort field is given.
    pub fn order_by(&self, allowed: &[(&str, &'static str)]) -> Result<String, AppError> {
        let Some(field) = self.sort_field.as_deref().filter(|f| !f.trim().is_empty()) else {
            return Ok("id DESC".to_string());
        };

        let column = allowed
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported sort field '{}'", field)))?;

        let direction = match self.sort_order.as_deref() {
            Some("ascend") => "ASC",
            _ => "DESC",
        };

        // Tie-break on id so pages stay stable.
        Ok(format!("{} {}, id DESC", column, direction))
    }
}

/// Number of pages needed for `total` rows, rounding up.
fn page_count(total: i64, size: i64) -> i64 {
    if size < 1 || total < 1 {
        return 0;
    }
    total / size + i64::from(total % size != 0)
}

/// One page of records.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: i64,
    pub size: i64,
    pub current: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total: i64, request: &PageRequest) -> Self {
        let size = request.page_size;
        Self {
            records,
            total,
            size,
            current: request.current,
            pages: page_count(total, size),
        }
    }

    /// Rebuilds the page around converted records, keeping the paging metadata.
    pub fn try_map<U, F>(self, f: F) -> Result<Page<U>, AppError>
    where
        F: FnMut(T) -> Result<U, AppError>,
    {
        let records = self.records.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            records,
            total: self.total,
            size: self.size,
            current: self.current,
            pages: self.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_ceiling_only_applies_when_given() {
        let mut request = PageRequest {
            page_size: 21,
            ..PageRequest::default()
        };
        assert!(matches!(request.check(Some(MAX_PAGE_SIZE)), Err(AppError::BadRequest(_))));
        assert!(request.check(None).is_ok());

        request.page_size = 20;
        assert!(request.check(Some(MAX_PAGE_SIZE)).is_ok());
    }

    #[test]
    fn rejects_non_positive_paging() {
        let request = PageRequest {
            current: 0,
            ..PageRequest::default()
        };
        assert!(request.check(None).is_err());

        let request = PageRequest {
            page_size: 0,
            ..PageRequest::default()
        };
        assert!(request.check(None).is_err());
    }

    #[test]
    fn order_by_uses_whitelist() {
        let allowed = [("created_at", "created_at")];
        let mut request = PageRequest::default();
        assert_eq!(request.order_by(&allowed).unwrap(), "id DESC");

        request.sort_field = Some("created_at".to_string());
        request.sort_order = Some("ascend".to_string());
        assert_eq!(request.order_by(&allowed).unwrap(), "created_at ASC, id DESC");

        request.sort_field = Some("password; DROP TABLE users".to_string());
        assert!(request.order_by(&allowed).is_err());
    }

    #[test]
    fn page_count_rounds_up() {
        let request = PageRequest {
            current: 2,
            page_size: 10,
            ..PageRequest::default()
        };
        let page = Page::new(vec![1, 2, 3], 23, &request);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current, 2);
        assert_eq!(request.offset(), 10);
    }

    #[test]
    fn huge_page_numbers_are_rejected_not_overflowed() {
        let request = PageRequest {
            current: i64::MAX,
            page_size: 20,
            ..PageRequest::default()
        };
        assert!(matches!(request.check(Some(MAX_PAGE_SIZE)), Err(AppError::BadRequest(_))));
        assert_eq!(request.offset(), i64::MAX);

        let request = PageRequest {
            current: 1,
            page_size: i64::MAX,
            ..PageRequest::default()
        };
        assert!(request.check(None).is_ok());
        assert_eq!(request.offset(), 0);
        assert_eq!(Page::new(vec![1], 1, &request).pages, 1);
        assert_eq!(Page::<i32>::new(vec![], 0, &request).pages, 0);
    }

    #[test]
    fn require_id_rejects_missing_and_non_positive() {
        assert!(require_id(None).is_err());
        assert!(require_id(Some(0)).is_err());
        assert!(require_id(Some(-3)).is_err());
        assert_eq!(require_id(Some(7)).unwrap(), 7);
    }
}
