use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_code;
use crate::models::Difficulty;

/// Request payload for creating a challenge
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateChallengeRequest {
    #[validate(custom(function = "validate_code"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    pub difficulty: Difficulty,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub link: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Activating a challenge deactivates all others
    pub is_active: Option<bool>,

    #[validate(length(min = 1, max = 100))]
    pub status: Option<String>,
}

/// Request payload for updating a challenge
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateChallengeRequest {
    #[validate(custom(function = "validate_code"))]
    pub code: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(url)]
    #[validate(length(max = 500))]
    pub link: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    pub is_active: Option<bool>,

    #[validate(length(min = 1, max = 100))]
    pub status: Option<String>,
}
