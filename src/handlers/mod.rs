// src/handlers/mod.rs

pub mod auth;
pub mod question;
pub mod scoring_result;
pub mod user_answer;
