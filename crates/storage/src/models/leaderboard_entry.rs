use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// Independent ranking pool. Ranks are unique within a partition only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "leaderboard_type", rename_all = "lowercase")]
pub enum LeaderboardType {
    Students,
    Groups,
}

impl LeaderboardType {
    pub const ALL: [LeaderboardType; 2] = [LeaderboardType::Students, LeaderboardType::Groups];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Groups => "groups",
        }
    }
}

impl fmt::Display for LeaderboardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaderboardType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "students" => Ok(Self::Students),
            "groups" => Ok(Self::Groups),
            _ => Err("type must be students or groups".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub entry_id: Uuid,
    #[serde(rename = "type")]
    pub entry_type: LeaderboardType,
    pub rank: i32,
    pub name: String,
    pub points: i32,
    pub solves: Option<i32>,
    pub members: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LeaderboardEntry {
    /// Position key within a partition: higher points first, then older, then lower id.
    pub fn ordering_key(&self) -> (std::cmp::Reverse<i32>, NaiveDateTime, Uuid) {
        (std::cmp::Reverse(self.points), self.created_at, self.entry_id)
    }
}

/// A leaderboard entry that has not been persisted yet. The rank is assigned by the engine.
#[derive(Debug, Clone)]
pub struct NewLeaderboardEntry {
    pub entry_type: LeaderboardType,
    pub name: String,
    pub points: i32,
    pub solves: Option<i32>,
    pub members: Option<i32>,
}

impl NewLeaderboardEntry {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_non_negative("points", Some(self.points))?;
        validate_non_negative("solves", self.solves)?;
        validate_non_negative("members", self.members)
    }
}

/// Partial update of an entry. `Some(None)` clears `solves` / `members`.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardEntryChanges {
    pub entry_type: Option<LeaderboardType>,
    pub name: Option<String>,
    pub points: Option<i32>,
    pub solves: Option<Option<i32>>,
    pub members: Option<Option<i32>>,
}

impl LeaderboardEntryChanges {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        validate_non_negative("points", self.points)?;
        validate_non_negative("solves", self.solves.flatten())?;
        validate_non_negative("members", self.members.flatten())
    }

    /// Applies every field except `rank`, which only the ranking engine writes.
    pub fn apply_to(&self, entry: &mut LeaderboardEntry) {
        if let Some(entry_type) = self.entry_type {
            entry.entry_type = entry_type;
        }
        if let Some(ref name) = self.name {
            entry.name = name.trim().to_string();
        }
        if let Some(points) = self.points {
            entry.points = points;
        }
        if let Some(solves) = self.solves {
            entry.solves = solves;
        }
        if let Some(members) = self.members {
            entry.members = members;
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidArgument(
            "name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(StorageError::InvalidArgument(format!(
            "{} must be a non-negative number",
            field
        ))),
        _ => Ok(()),
    }
}
