use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::double_option;
use crate::error::StorageError;
use crate::models::{LeaderboardEntryChanges, LeaderboardType, NewLeaderboardEntry};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// `students` (default) or `groups`
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
}

impl LeaderboardQuery {
    pub fn entry_type(&self) -> Result<LeaderboardType, String> {
        match self.entry_type.as_deref() {
            None => Ok(LeaderboardType::Students),
            Some(value) => value.parse(),
        }
    }
}

/// Request payload for adding a leaderboard entry
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLeaderboardEntryRequest {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_leaderboard_type"))]
    pub entry_type: String,

    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(range(min = 0, message = "points must be a non-negative number"))]
    pub points: i32,

    #[validate(range(min = 0, message = "solves must be a non-negative number"))]
    pub solves: Option<i32>,

    #[validate(range(min = 0, message = "members must be a non-negative number"))]
    pub members: Option<i32>,
}

/// Request payload for editing a leaderboard entry. `null` clears solves/members.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLeaderboardEntryRequest {
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_leaderboard_type"))]
    pub entry_type: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "points must be a non-negative number"))]
    pub points: Option<i32>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub solves: Option<Option<i32>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub members: Option<Option<i32>>,
}

fn validate_leaderboard_type(value: &str) -> Result<(), validator::ValidationError> {
    value.parse::<LeaderboardType>().map(|_| ()).map_err(|_| {
        let mut error = validator::ValidationError::new("invalid_leaderboard_type");
        error.message = Some("type must be students or groups".into());
        error
    })
}

fn parse_type(value: &str) -> Result<LeaderboardType, StorageError> {
    value.parse().map_err(StorageError::InvalidArgument)
}

impl TryFrom<CreateLeaderboardEntryRequest> for NewLeaderboardEntry {
    type Error = StorageError;

    fn try_from(req: CreateLeaderboardEntryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_type: parse_type(&req.entry_type)?,
            name: req.name,
            points: req.points,
            solves: req.solves,
            members: req.members,
        })
    }
}

impl TryFrom<UpdateLeaderboardEntryRequest> for LeaderboardEntryChanges {
    type Error = StorageError;

    fn try_from(req: UpdateLeaderboardEntryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            entry_type: req.entry_type.as_deref().map(parse_type).transpose()?,
            name: req.name,
            points: req.points,
            solves: req.solves,
            members: req.members,
        })
    }
}
