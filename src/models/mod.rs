// src/models/mod.rs

use url::Url;

pub mod common;
pub mod question;
pub mod scoring_result;
pub mod user;
pub mod user_answer;

/// Validates that a string is a correctly formatted URL.
pub fn validate_url(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
