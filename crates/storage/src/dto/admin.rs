use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Challenge, LeaderboardEntry, Question};

/// Everything the admin panel shows on load
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverviewResponse {
    pub challenges: Vec<Challenge>,
    pub questions: Vec<Question>,
    pub leaderboard: Vec<LeaderboardEntry>,
}
