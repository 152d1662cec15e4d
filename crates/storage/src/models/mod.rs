mod admin_user;
mod challenge;
mod leaderboard_entry;
mod question;

pub use admin_user::AdminUser;
pub use challenge::{Challenge, Difficulty};
pub use leaderboard_entry::{
    LeaderboardEntry, LeaderboardEntryChanges, LeaderboardType, NewLeaderboardEntry,
};
pub use question::{DEFAULT_QUESTION_LINK, Question};
