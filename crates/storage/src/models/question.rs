use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Difficulty;

pub const DEFAULT_QUESTION_LINK: &str = "https://leetcode.com/problemset/";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Question {
    pub question_id: Uuid,
    pub code: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub description: String,
    pub snippet: String,
    pub link: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
