//! In-memory `LeaderboardStore` for exercising the ranking engine without PostgreSQL.
//!
//! Mirrors the non-deferrable `(entry_type, rank)` constraint: every row written
//! inside a batch is checked against the rows not yet rewritten, and a failing
//! batch leaves nothing behind.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use super::leaderboard::LeaderboardStore;
use crate::error::{Result, StorageError};
use crate::models::{LeaderboardEntry, LeaderboardType, NewLeaderboardEntry};

#[derive(Default)]
pub struct MemoryLeaderboardStore {
    rows: Mutex<Vec<LeaderboardEntry>>,
    fixed_time: Option<NaiveDateTime>,
    rank_writes: AtomicUsize,
    failing_rank_write: Mutex<Option<usize>>,
}

impl MemoryLeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert gets the same `created_at`, to exercise the id tie-break.
    pub fn with_fixed_time(time: NaiveDateTime) -> Self {
        Self {
            fixed_time: Some(time),
            ..Self::default()
        }
    }

    /// Puts rows in place as-is, bypassing the rank constraint.
    pub fn seed(&self, entries: Vec<LeaderboardEntry>) {
        self.rows.lock().unwrap().extend(entries);
    }

    pub fn rank_writes(&self) -> usize {
        self.rank_writes.load(Ordering::SeqCst)
    }

    /// Makes the rank write after `successes` more successful ones fail once.
    pub fn fail_rank_write_after(&self, successes: usize) {
        *self.failing_rank_write.lock().unwrap() = Some(successes);
    }

    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        self.rows.lock().unwrap().clone()
    }

    fn now(&self) -> NaiveDateTime {
        self.fixed_time.unwrap_or_else(|| Utc::now().naive_utc())
    }
}

fn check_rank_free(
    rows: &[LeaderboardEntry],
    id: Uuid,
    entry_type: LeaderboardType,
    rank: i32,
) -> Result<()> {
    let taken = rows
        .iter()
        .any(|r| r.entry_id != id && r.entry_type == entry_type && r.rank == rank);

    if taken {
        return Err(StorageError::ConstraintViolation(format!(
            "rank {} is already taken in {}",
            rank, entry_type
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl LeaderboardStore for MemoryLeaderboardStore {
    async fn find_by_type(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>> {
        let mut entries: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.entry_type == entry_type)
            .cloned()
            .collect();
        entries.sort_by_key(LeaderboardEntry::ordering_key);
        Ok(entries)
    }

    async fn find_ranked(&self, entry_type: LeaderboardType) -> Result<Vec<LeaderboardEntry>> {
        let mut entries: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.entry_type == entry_type)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.rank);
        Ok(entries)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<LeaderboardEntry> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.entry_id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn highest_rank(&self, entry_type: LeaderboardType) -> Result<Option<i32>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.entry_type == entry_type)
            .map(|r| r.rank)
            .max())
    }

    async fn insert(&self, entry: &NewLeaderboardEntry, rank: i32) -> Result<LeaderboardEntry> {
        let mut rows = self.rows.lock().unwrap();
        let id = Uuid::new_v4();
        check_rank_free(&rows, id, entry.entry_type, rank)?;

        let now = self.now();
        let created = LeaderboardEntry {
            entry_id: id,
            entry_type: entry.entry_type,
            rank,
            name: entry.name.clone(),
            points: entry.points,
            solves: entry.solves,
            members: entry.members,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn save(&self, entry: &LeaderboardEntry) -> Result<LeaderboardEntry> {
        let mut rows = self.rows.lock().unwrap();
        check_rank_free(&rows, entry.entry_id, entry.entry_type, entry.rank)?;

        let now = self.now();
        let row = rows
            .iter_mut()
            .find(|r| r.entry_id == entry.entry_id)
            .ok_or(StorageError::NotFound)?;

        row.entry_type = entry.entry_type;
        row.rank = entry.rank;
        row.name = entry.name.clone();
        row.points = entry.points;
        row.solves = entry.solves;
        row.members = entry.members;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<LeaderboardEntry> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows
            .iter()
            .position(|r| r.entry_id == id)
            .ok_or(StorageError::NotFound)?;
        Ok(rows.remove(index))
    }

    async fn set_ranks(&self, ranks: &[(Uuid, i32)]) -> Result<()> {
        {
            let mut failing = self.failing_rank_write.lock().unwrap();
            match *failing {
                Some(0) => {
                    *failing = None;
                    return Err(StorageError::ConstraintViolation(
                        "rank rewrite rejected".to_string(),
                    ));
                }
                Some(remaining) => *failing = Some(remaining - 1),
                None => {}
            }
        }

        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();

        for &(id, rank) in ranks {
            let Some(index) = staged.iter().position(|r| r.entry_id == id) else {
                continue;
            };
            check_rank_free(&staged, id, staged[index].entry_type, rank)?;
            staged[index].rank = rank;
        }

        *rows = staged;
        self.rank_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
