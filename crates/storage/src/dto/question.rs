use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::non_blank;
use super::validate_code;
use crate::models::Difficulty;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionFilter {
    /// Case-insensitive substring of the title or category
    pub search: Option<String>,
    /// Exact category, case-insensitive
    pub category: Option<String>,
}

impl QuestionFilter {
    pub fn search(&self) -> Option<&str> {
        non_blank(self.search.as_ref())
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_ref())
    }
}

/// Request payload for creating a question
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(custom(function = "validate_code"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    pub difficulty: Difficulty,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Snippet is required"))]
    pub snippet: String,

    /// Defaults to the LeetCode problem set
    #[validate(url)]
    #[validate(length(max = 500))]
    pub link: Option<String>,
}

/// Request payload for updating a question
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionRequest {
    #[validate(custom(function = "validate_code"))]
    pub code: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub snippet: Option<String>,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub link: Option<String>,
}
