use storage::{
    Database,
    dto::leaderboard::{CreateLeaderboardEntryRequest, UpdateLeaderboardEntryRequest},
    error::Result,
    models::{LeaderboardEntry, LeaderboardEntryChanges, LeaderboardType, NewLeaderboardEntry},
    repository::leaderboard::LeaderboardRepository,
    services::leaderboard_ranking,
};
use uuid::Uuid;

/// Entries of one leaderboard in rank order
pub async fn list_entries(db: &Database, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>> {
    let repo = LeaderboardRepository::new(db.pool());
    leaderboard_ranking::list_by_partition(&repo, entry_type).await
}

/// Both leaderboards, students first
pub async fn list_all_entries(db: &Database) -> Result<Vec<LeaderboardEntry>> {
    let repo = LeaderboardRepository::new(db.pool());
    repo.list_all().await
}

pub async fn create_entry(
    db: &Database,
    request: CreateLeaderboardEntryRequest,
) -> Result<LeaderboardEntry> {
    let repo = LeaderboardRepository::new(db.pool());
    let new_entry = NewLeaderboardEntry::try_from(request)?;

    leaderboard_ranking::create_entry(&repo, db.rank_locks(), new_entry).await
}

pub async fn update_entry(
    db: &Database,
    id: Uuid,
    request: UpdateLeaderboardEntryRequest,
) -> Result<LeaderboardEntry> {
    let repo = LeaderboardRepository::new(db.pool());
    let changes = LeaderboardEntryChanges::try_from(request)?;

    leaderboard_ranking::update_entry(&repo, db.rank_locks(), id, changes).await
}

pub async fn delete_entry(db: &Database, id: Uuid) -> Result<()> {
    let repo = LeaderboardRepository::new(db.pool());
    leaderboard_ranking::delete_entry(&repo, db.rank_locks(), id).await
}
