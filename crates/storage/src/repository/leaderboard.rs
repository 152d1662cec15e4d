use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{LeaderboardEntry, LeaderboardType, NewLeaderboardEntry};

const ENTRY_COLUMNS: &str =
    "entry_id, entry_type, rank, name, points, solves, members, created_at, updated_at";

/// Persistence operations the ranking engine relies on.
///
/// Implementations must reject any write that leaves two entries of the same
/// partition sharing a rank, checking row by row even inside a bulk write.
#[async_trait::async_trait]
pub trait LeaderboardStore: Send + Sync {
    /// Entries of a partition by points desc, created_at asc, entry_id asc.
    async fn find_by_type(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>>;

    /// Entries of a partition by their materialized rank.
    async fn find_ranked(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>>;

    async fn find_by_id(&self, id: Uuid) -> Result<LeaderboardEntry>;

    async fn highest_rank(&self, entry_type: LeaderboardType) -> Result<Option<i32>>;

    async fn insert(&self, entry: &NewLeaderboardEntry, rank: i32) -> Result<LeaderboardEntry>;

    /// Persists every mutable column of `entry`, including the rank chosen by the engine.
    async fn save(&self, entry: &LeaderboardEntry) -> Result<LeaderboardEntry>;

    /// Removes the entry and returns it as it was before deletion.
    async fn delete(&self, id: Uuid) -> Result<LeaderboardEntry>;

    /// Applies all `(entry_id, rank)` pairs as one atomic write.
    async fn set_ranks(&self, ranks: &[(Uuid, i32)]) -> Result<()>;
}

pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All entries, grouped by partition and ordered by rank
    pub async fn list_all(&self) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries ORDER BY entry_type, rank"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl LeaderboardStore for LeaderboardRepository<'_> {
    async fn find_by_type(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM leaderboard_entries
            WHERE entry_type = $1
            ORDER BY points DESC, created_at ASC, entry_id ASC
            "#
        ))
        .bind(entry_type)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_ranked(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM leaderboard_entries
            WHERE entry_type = $1
            ORDER BY rank ASC
            "#
        ))
        .bind(entry_type)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<LeaderboardEntry> {
        sqlx::query_as::<_, LeaderboardEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries WHERE entry_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn highest_rank(&self, entry_type: LeaderboardType) -> Result<Option<i32>> {
        let rank = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(rank) FROM leaderboard_entries WHERE entry_type = $1",
        )
        .bind(entry_type)
        .fetch_one(self.pool)
        .await?;

        Ok(rank)
    }

    async fn insert(&self, entry: &NewLeaderboardEntry, rank: i32) -> Result<LeaderboardEntry> {
        sqlx::query_as::<_, LeaderboardEntry>(&format!(
            r#"
            INSERT INTO leaderboard_entries (entry_type, rank, name, points, solves, members)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.entry_type)
        .bind(rank)
        .bind(&entry.name)
        .bind(entry.points)
        .bind(entry.solves)
        .bind(entry.members)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_unique_violation(format!(
                "rank {} is already taken in {}",
                rank, entry.entry_type
            ))
        })
    }

    async fn save(&self, entry: &LeaderboardEntry) -> Result<LeaderboardEntry> {
        sqlx::query_as::<_, LeaderboardEntry>(&format!(
            r#"
            UPDATE leaderboard_entries
            SET entry_type = $2,
                rank = $3,
                name = $4,
                points = $5,
                solves = $6,
                members = $7,
                updated_at = NOW()
            WHERE entry_id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.entry_id)
        .bind(entry.entry_type)
        .bind(entry.rank)
        .bind(&entry.name)
        .bind(entry.points)
        .bind(entry.solves)
        .bind(entry.members)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e).on_unique_violation(format!(
                "rank {} is already taken in {}",
                entry.rank, entry.entry_type
            ))
        })?
        .ok_or(StorageError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<LeaderboardEntry> {
        sqlx::query_as::<_, LeaderboardEntry>(&format!(
            "DELETE FROM leaderboard_entries WHERE entry_id = $1 RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    async fn set_ranks(&self, ranks: &[(Uuid, i32)]) -> Result<()> {
        if ranks.is_empty() {
            return Ok(());
        }

        let (ids, values): (Vec<Uuid>, Vec<i32>) = ranks.iter().copied().unzip();

        // Single statement, so the batch is atomic.
        sqlx::query(
            r#"
            UPDATE leaderboard_entries AS e
            SET rank = v.rank
            FROM UNNEST($1::uuid[], $2::int4[]) AS v(entry_id, rank)
            WHERE e.entry_id = v.entry_id
            "#,
        )
        .bind(&ids)
        .bind(&values)
        .execute(self.pool)
        .await
        .map_err(|e| {
            StorageError::from(e)
                .on_unique_violation("rank rewrite collided with an existing rank")
        })?;

        Ok(())
    }
}
