//! Dense rank maintenance for leaderboard partitions.
//!
//! Every partition keeps ranks `1..=N` ordered by points desc, created_at asc,
//! entry_id asc. Ranks are rewritten in two bulk writes: first into a range above
//! every rank in use, then into their final slots, so that no single row update
//! can collide with the `(entry_type, rank)` unique constraint.

use std::collections::HashSet;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    LeaderboardEntry, LeaderboardEntryChanges, LeaderboardType, NewLeaderboardEntry,
};
use crate::repository::leaderboard::LeaderboardStore;

/// Gap between the highest rank in use and the temporary range of the first write.
pub const TEMPORARY_RANK_OFFSET: i32 = 1000;

/// Serializes mutations per partition within this process.
#[derive(Debug, Default)]
pub struct RankLocks {
    students: Mutex<()>,
    groups: Mutex<()>,
}

/// Held for the whole mutate-then-recompute sequence.
pub struct PartitionGuard<'a> {
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl RankLocks {
    fn lock_for(&self, entry_type: LeaderboardType) -> &Mutex<()> {
        match entry_type {
            LeaderboardType::Students => &self.students,
            LeaderboardType::Groups => &self.groups,
        }
    }

    /// Locks the given partitions, always in `LeaderboardType` order.
    pub async fn acquire(&self, entry_types: &[LeaderboardType]) -> PartitionGuard<'_> {
        let mut ordered = entry_types.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for entry_type in ordered {
            guards.push(self.lock_for(entry_type).lock().await);
        }

        PartitionGuard { _guards: guards }
    }
}

/// Rewrites the ranks of one partition so they are exactly `1..=N` in sort order.
///
/// Running it twice in a row yields the same assignment, which also repairs a
/// partition left with temporary ranks by an interrupted run.
pub async fn recompute_ranks<S>(store: &S, entry_type: LeaderboardType) -> Result<()>
where
    S: LeaderboardStore + ?Sized,
{
    let entries = store.find_by_type(entry_type).await?;

    if entries.is_empty() {
        tracing::debug!(%entry_type, "No entries to rank");
        return Ok(());
    }

    let count = i32::try_from(entries.len()).map_err(|_| {
        StorageError::InvalidArgument(format!("too many entries in {}", entry_type))
    })?;
    let slots = temporary_slots(&entries, count).ok_or_else(|| {
        StorageError::ConstraintViolation(format!("no free temporary ranks in {}", entry_type))
    })?;

    let temporary: Vec<(Uuid, i32)> = entries
        .iter()
        .zip(slots)
        .map(|(entry, slot)| (entry.entry_id, slot))
        .collect();
    store.set_ranks(&temporary).await?;

    let final_ranks: Vec<(Uuid, i32)> = entries
        .iter()
        .zip(1..)
        .map(|(entry, rank)| (entry.entry_id, rank))
        .collect();
    store.set_ranks(&final_ranks).await?;

    tracing::debug!(%entry_type, count, "Recomputed leaderboard ranks");
    Ok(())
}

/// `count` ranks clear of both `1..=count` and every rank currently in use.
///
/// Normally a contiguous block past the highest rank plus the offset. When that
/// block would not fit in an `i32`, the lowest free ranks above `count` are used.
fn temporary_slots(entries: &[LeaderboardEntry], count: i32) -> Option<Vec<i32>> {
    let highest_in_use = entries.iter().map(|e| e.rank).max().unwrap_or(0);

    let contiguous = count
        .max(highest_in_use)
        .checked_add(TEMPORARY_RANK_OFFSET)
        .filter(|base| base.checked_add(count).is_some());
    if let Some(base) = contiguous {
        return Some((1..=count).map(|position| base + position).collect());
    }

    tracing::warn!(highest_in_use, count, "Rank range exhausted, reusing free ranks");
    let in_use: HashSet<i32> = entries.iter().map(|e| e.rank).collect();
    let free: Vec<i32> = (count.checked_add(1)?..=i32::MAX)
        .filter(|rank| !in_use.contains(rank))
        .take(entries.len())
        .collect();

    (free.len() == entries.len()).then_some(free)
}

/// Entries of a partition in rank order. Read-only.
pub async fn list_by_partition<S>(
    store: &S,
    entry_type: LeaderboardType,
) -> Result<Vec<LeaderboardEntry>>
where
    S: LeaderboardStore + ?Sized,
{
    store.find_ranked(entry_type).await
}

/// Inserts an entry at a provisional rank and folds it into place.
///
/// Returns the entry as stored after the recompute.
pub async fn create_entry<S>(
    store: &S,
    locks: &RankLocks,
    mut new_entry: NewLeaderboardEntry,
) -> Result<LeaderboardEntry>
where
    S: LeaderboardStore + ?Sized,
{
    new_entry.validate()?;
    new_entry.name = new_entry.name.trim().to_string();

    let entry_type = new_entry.entry_type;
    let _guard = locks.acquire(&[entry_type]).await;

    let provisional_rank = next_rank(store, entry_type).await?;
    let created = store.insert(&new_entry, provisional_rank).await?;
    tracing::info!(entry_id = %created.entry_id, %entry_type, "Created leaderboard entry");

    recompute_ranks(store, entry_type).await?;

    store.find_by_id(created.entry_id).await
}

/// Applies field changes and re-ranks the partitions involved.
///
/// A partition move parks the entry one past the destination's highest rank
/// before both partitions are recomputed.
pub async fn update_entry<S>(
    store: &S,
    locks: &RankLocks,
    id: Uuid,
    changes: LeaderboardEntryChanges,
) -> Result<LeaderboardEntry>
where
    S: LeaderboardStore + ?Sized,
{
    changes.validate()?;

    let (mut entry, _guard) = lock_entry(store, locks, id, changes.entry_type).await?;
    let previous_type = entry.entry_type;

    changes.apply_to(&mut entry);
    let moved = entry.entry_type != previous_type;
    if moved {
        entry.rank = next_rank(store, entry.entry_type).await?;
    }

    store.save(&entry).await?;
    tracing::info!(entry_id = %id, %previous_type, new_type = %entry.entry_type, "Updated leaderboard entry");

    recompute_ranks(store, previous_type).await?;
    if moved {
        recompute_ranks(store, entry.entry_type).await?;
    }

    store.find_by_id(id).await
}

/// Removes an entry and closes the gap it leaves.
pub async fn delete_entry<S>(store: &S, locks: &RankLocks, id: Uuid) -> Result<()>
where
    S: LeaderboardStore + ?Sized,
{
    let (_, _guard) = lock_entry(store, locks, id, None).await?;

    let deleted = store.delete(id).await?;
    tracing::info!(entry_id = %id, entry_type = %deleted.entry_type, "Deleted leaderboard entry");

    recompute_ranks(store, deleted.entry_type).await
}

async fn next_rank<S>(store: &S, entry_type: LeaderboardType) -> Result<i32>
where
    S: LeaderboardStore + ?Sized,
{
    let highest = store.highest_rank(entry_type).await?.unwrap_or(0);
    if let Some(next) = highest.checked_add(1) {
        return Ok(next);
    }

    tracing::warn!(%entry_type, "Highest rank is at the limit, recomputing before placing entry");
    recompute_ranks(store, entry_type).await?;

    store
        .highest_rank(entry_type)
        .await?
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!("rank range exhausted in {}", entry_type))
        })
}

/// Loads an entry with its partition (and `destination`, if any) locked.
///
/// Retries if another request moved the entry between the first read and the lock.
async fn lock_entry<'l, S>(
    store: &S,
    locks: &'l RankLocks,
    id: Uuid,
    destination: Option<LeaderboardType>,
) -> Result<(LeaderboardEntry, PartitionGuard<'l>)>
where
    S: LeaderboardStore + ?Sized,
{
    loop {
        let seen = store.find_by_id(id).await?;

        let mut partitions = vec![seen.entry_type];
        partitions.extend(destination);
        let guard = locks.acquire(&partitions).await;

        let entry = store.find_by_id(id).await?;
        if entry.entry_type == seen.entry_type {
            return Ok((entry, guard));
        }

        tracing::debug!(entry_id = %id, "Entry changed partition while waiting for lock, retrying");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{Duration, NaiveDateTime, Utc};

    use super::*;
    use crate::repository::memory::MemoryLeaderboardStore;

    fn new_entry(entry_type: LeaderboardType, name: &str, points: i32) -> NewLeaderboardEntry {
        NewLeaderboardEntry {
            entry_type,
            name: name.to_string(),
            points,
            solves: None,
            members: None,
        }
    }

    fn raw_entry(
        entry_type: LeaderboardType,
        rank: i32,
        points: i32,
        created_at: NaiveDateTime,
        id: Uuid,
    ) -> LeaderboardEntry {
        LeaderboardEntry {
            entry_id: id,
            entry_type,
            rank,
            name: format!("entry-{}", id.as_u128()),
            points,
            solves: None,
            members: None,
            created_at,
            updated_at: created_at,
        }
    }

    async fn create(
        store: &MemoryLeaderboardStore,
        locks: &RankLocks,
        name: &str,
        points: i32,
    ) -> LeaderboardEntry {
        create_entry(store, locks, new_entry(LeaderboardType::Students, name, points))
            .await
            .unwrap()
    }

    async fn standings(
        store: &MemoryLeaderboardStore,
        entry_type: LeaderboardType,
    ) -> Vec<(String, i32, i32)> {
        list_by_partition(store, entry_type)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.points, e.rank))
            .collect()
    }

    /// Ranks are exactly 1..=N and follow the ordering key.
    async fn assert_consistent(store: &MemoryLeaderboardStore, entry_type: LeaderboardType) {
        let ranked = list_by_partition(store, entry_type).await.unwrap();
        let ranks: Vec<i32> = ranked.iter().map(|e| e.rank).collect();
        let expected: Vec<i32> = (1..=ranked.len() as i32).collect();
        assert_eq!(ranks, expected, "ranks of {} are not dense", entry_type);

        let mut by_key = ranked.clone();
        by_key.sort_by_key(LeaderboardEntry::ordering_key);
        assert_eq!(ranked, by_key, "ranks of {} do not follow ordering", entry_type);
    }

    #[tokio::test]
    async fn test_create_into_empty_partition_gets_rank_one() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();

        let ann = create(&store, &locks, "Ann", 100).await;

        assert_eq!(ann.rank, 1);
        assert_eq!(ann.entry_type, LeaderboardType::Students);
        assert_consistent(&store, LeaderboardType::Students).await;
    }

    #[tokio::test]
    async fn test_create_between_existing_entries() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;

        let cy = create(&store, &locks, "Cy", 95).await;

        assert_eq!(cy.rank, 2);
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![
                ("Ann".to_string(), 100, 1),
                ("Cy".to_string(), 95, 2),
                ("Bo".to_string(), 90, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_points_change_moves_entry_within_partition() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        create(&store, &locks, "Ann", 100).await;
        let bo = create(&store, &locks, "Bo", 90).await;
        create(&store, &locks, "Cy", 95).await;

        let changes = LeaderboardEntryChanges {
            points: Some(150),
            ..Default::default()
        };
        let bo = update_entry(&store, &locks, bo.entry_id, changes).await.unwrap();

        assert_eq!(bo.rank, 1);
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![
                ("Bo".to_string(), 150, 1),
                ("Ann".to_string(), 100, 2),
                ("Cy".to_string(), 95, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_closes_the_gap() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 150).await;
        let cy = create(&store, &locks, "Cy", 95).await;
        assert_eq!(cy.rank, 3);

        delete_entry(&store, &locks, cy.entry_id).await.unwrap();

        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 150, 1), ("Ann".to_string(), 100, 2)]
        );
        assert!(store.find_by_id(cy.entry_id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_first_place_renumbers_the_rest() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;
        create(&store, &locks, "Cy", 80).await;

        delete_entry(&store, &locks, ann.entry_id).await.unwrap();

        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 90, 1), ("Cy".to_string(), 80, 2)]
        );
    }

    #[tokio::test]
    async fn test_partition_move_renumbers_both_partitions() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 150).await;
        create(&store, &locks, "Cy", 95).await;
        for (name, points) in [("Lambda", 200), ("Kappa", 50)] {
            create_entry(&store, &locks, new_entry(LeaderboardType::Groups, name, points))
                .await
                .unwrap();
        }

        let changes = LeaderboardEntryChanges {
            entry_type: Some(LeaderboardType::Groups),
            ..Default::default()
        };
        let moved = update_entry(&store, &locks, ann.entry_id, changes).await.unwrap();

        assert_eq!(moved.entry_type, LeaderboardType::Groups);
        assert_eq!(moved.rank, 2);
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 150, 1), ("Cy".to_string(), 95, 2)]
        );
        assert_eq!(
            standings(&store, LeaderboardType::Groups).await,
            vec![
                ("Lambda".to_string(), 200, 1),
                ("Ann".to_string(), 100, 2),
                ("Kappa".to_string(), 50, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_partition_move_into_empty_partition() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;

        let changes = LeaderboardEntryChanges {
            entry_type: Some(LeaderboardType::Groups),
            members: Some(Some(4)),
            ..Default::default()
        };
        let moved = update_entry(&store, &locks, ann.entry_id, changes).await.unwrap();

        assert_eq!(moved.rank, 1);
        assert_eq!(moved.members, Some(4));
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 90, 1)]
        );
    }

    #[tokio::test]
    async fn test_delete_sole_entry_leaves_partition_empty() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        let writes_before = store.rank_writes();

        delete_entry(&store, &locks, ann.entry_id).await.unwrap();

        assert!(standings(&store, LeaderboardType::Students).await.is_empty());
        assert_eq!(store.rank_writes(), writes_before);
    }

    #[tokio::test]
    async fn test_recompute_empty_partition_writes_nothing() {
        let store = MemoryLeaderboardStore::new();

        recompute_ranks(&store, LeaderboardType::Groups).await.unwrap();

        assert_eq!(store.rank_writes(), 0);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        for (name, points) in [("Ann", 100), ("Bo", 100), ("Cy", 40), ("Di", 70)] {
            create(&store, &locks, name, points).await;
        }

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();
        let first = store.snapshot();
        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();
        let second = store.snapshot();

        let ranks = |rows: Vec<LeaderboardEntry>| -> HashMap<Uuid, i32> {
            rows.into_iter().map(|e| (e.entry_id, e.rank)).collect()
        };
        assert_eq!(ranks(first), ranks(second));
        assert_consistent(&store, LeaderboardType::Students).await;
    }

    #[tokio::test]
    async fn test_equal_points_rank_earlier_creation_first() {
        let store = MemoryLeaderboardStore::new();
        let base = Utc::now().naive_utc();
        let older = Uuid::from_u128(9);
        let newer = Uuid::from_u128(1);
        store.seed(vec![
            raw_entry(LeaderboardType::Students, 1, 50, base + Duration::seconds(5), newer),
            raw_entry(LeaderboardType::Students, 2, 50, base, older),
        ]);

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();

        let ranked = list_by_partition(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(ranked[0].entry_id, older);
        assert_eq!(ranked[1].entry_id, newer);
    }

    #[tokio::test]
    async fn test_equal_points_and_timestamp_rank_lower_id_first() {
        let store = MemoryLeaderboardStore::new();
        let at = Utc::now().naive_utc();
        let low = Uuid::from_u128(1);
        let mid = Uuid::from_u128(2);
        let high = Uuid::from_u128(3);
        store.seed(vec![
            raw_entry(LeaderboardType::Groups, 1, 10, at, high),
            raw_entry(LeaderboardType::Groups, 2, 10, at, low),
            raw_entry(LeaderboardType::Groups, 3, 10, at, mid),
        ]);

        for _ in 0..3 {
            recompute_ranks(&store, LeaderboardType::Groups).await.unwrap();
            let order: Vec<Uuid> = list_by_partition(&store, LeaderboardType::Groups)
                .await
                .unwrap()
                .into_iter()
                .map(|e| e.entry_id)
                .collect();
            assert_eq!(order, vec![low, mid, high]);
        }
    }

    #[tokio::test]
    async fn test_same_timestamp_creates_are_deterministic() {
        let store = MemoryLeaderboardStore::with_fixed_time(Utc::now().naive_utc());
        let locks = RankLocks::default();
        let a = create(&store, &locks, "A", 30).await;
        let b = create(&store, &locks, "B", 30).await;

        let (first, second) = if a.entry_id < b.entry_id { (a, b) } else { (b, a) };
        let ranked = list_by_partition(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(ranked[0].entry_id, first.entry_id);
        assert_eq!(ranked[1].entry_id, second.entry_id);
    }

    #[tokio::test]
    async fn test_recompute_leaves_other_partition_untouched() {
        let store = MemoryLeaderboardStore::new();
        let at = Utc::now().naive_utc();
        // Deliberately out of order so a recompute would change it.
        store.seed(vec![
            raw_entry(LeaderboardType::Groups, 1, 10, at, Uuid::from_u128(1)),
            raw_entry(LeaderboardType::Groups, 2, 90, at, Uuid::from_u128(2)),
            raw_entry(LeaderboardType::Students, 1, 5, at, Uuid::from_u128(3)),
        ]);

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();

        let groups = list_by_partition(&store, LeaderboardType::Groups).await.unwrap();
        assert_eq!(groups[0].entry_id, Uuid::from_u128(1));
        assert_eq!(groups[0].rank, 1);
        assert_eq!(groups[1].rank, 2);
    }

    #[tokio::test]
    async fn test_recompute_heals_leftover_temporary_ranks() {
        let store = MemoryLeaderboardStore::new();
        let at = Utc::now().naive_utc();
        // State of a run interrupted after its first write, with one entry since removed.
        store.seed(vec![
            raw_entry(LeaderboardType::Students, 1006, 80, at, Uuid::from_u128(1)),
            raw_entry(LeaderboardType::Students, 1007, 70, at, Uuid::from_u128(2)),
            raw_entry(LeaderboardType::Students, 1009, 90, at, Uuid::from_u128(3)),
        ]);

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();

        assert_consistent(&store, LeaderboardType::Students).await;
        let ranked = list_by_partition(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(ranked[0].entry_id, Uuid::from_u128(3));
    }

    #[tokio::test]
    async fn test_recompute_with_rank_near_i32_max() {
        let store = MemoryLeaderboardStore::new();
        let at = Utc::now().naive_utc();
        store.seed(vec![
            raw_entry(LeaderboardType::Students, i32::MAX - 5, 90, at, Uuid::from_u128(1)),
            raw_entry(LeaderboardType::Students, 1, 40, at, Uuid::from_u128(2)),
        ]);

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();

        assert_consistent(&store, LeaderboardType::Students).await;
        let ranked = list_by_partition(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(ranked[0].entry_id, Uuid::from_u128(1));
        assert_eq!(ranked[1].entry_id, Uuid::from_u128(2));
    }

    #[tokio::test]
    async fn test_recompute_when_top_ranks_are_all_taken() {
        let store = MemoryLeaderboardStore::new();
        let at = Utc::now().naive_utc();
        store.seed(vec![
            raw_entry(LeaderboardType::Groups, i32::MAX, 10, at, Uuid::from_u128(1)),
            raw_entry(LeaderboardType::Groups, i32::MAX - 1, 20, at, Uuid::from_u128(2)),
            raw_entry(LeaderboardType::Groups, 3, 30, at, Uuid::from_u128(3)),
        ]);

        recompute_ranks(&store, LeaderboardType::Groups).await.unwrap();

        assert_consistent(&store, LeaderboardType::Groups).await;
        let order: Vec<u128> = list_by_partition(&store, LeaderboardType::Groups)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.entry_id.as_u128())
            .collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_create_after_rank_at_i32_max() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let at = Utc::now().naive_utc();
        store.seed(vec![raw_entry(
            LeaderboardType::Students,
            i32::MAX,
            50,
            at,
            Uuid::from_u128(7),
        )]);

        let ann = create(&store, &locks, "Ann", 100).await;

        assert_eq!(ann.rank, 1);
        assert_consistent(&store, LeaderboardType::Students).await;
    }

    #[tokio::test]
    async fn test_create_fails_when_recompute_fails() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        create(&store, &locks, "Bo", 90).await;

        store.fail_rank_write_after(0);
        let result =
            create_entry(&store, &locks, new_entry(LeaderboardType::Students, "Ann", 100)).await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        // The insert itself persisted at its provisional rank.
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 90, 1), ("Ann".to_string(), 100, 2)]
        );

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Ann".to_string(), 100, 1), ("Bo".to_string(), 90, 2)]
        );
    }

    #[tokio::test]
    async fn test_update_fails_between_rank_writes_then_heals() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;
        let cy = create(&store, &locks, "Cy", 80).await;

        store.fail_rank_write_after(1);
        let changes = LeaderboardEntryChanges {
            points: Some(150),
            ..Default::default()
        };
        let result = update_entry(&store, &locks, cy.entry_id, changes).await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        let stranded = list_by_partition(&store, LeaderboardType::Students).await.unwrap();
        assert!(stranded.iter().all(|e| e.rank > 3));

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![
                ("Cy".to_string(), 150, 1),
                ("Ann".to_string(), 100, 2),
                ("Bo".to_string(), 90, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_partition_move_fails_when_destination_recompute_fails() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;
        create_entry(&store, &locks, new_entry(LeaderboardType::Groups, "Lambda", 50))
            .await
            .unwrap();

        // Source recompute takes two writes, the destination's first one fails.
        store.fail_rank_write_after(2);
        let changes = LeaderboardEntryChanges {
            entry_type: Some(LeaderboardType::Groups),
            ..Default::default()
        };
        let result = update_entry(&store, &locks, ann.entry_id, changes).await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        assert_consistent(&store, LeaderboardType::Students).await;
        assert_eq!(
            standings(&store, LeaderboardType::Groups).await,
            vec![("Lambda".to_string(), 50, 1), ("Ann".to_string(), 100, 2)]
        );

        recompute_ranks(&store, LeaderboardType::Groups).await.unwrap();
        assert_eq!(
            standings(&store, LeaderboardType::Groups).await,
            vec![("Ann".to_string(), 100, 1), ("Lambda".to_string(), 50, 2)]
        );
    }

    #[tokio::test]
    async fn test_delete_fails_when_recompute_fails() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        create(&store, &locks, "Bo", 90).await;
        create(&store, &locks, "Cy", 80).await;

        store.fail_rank_write_after(0);
        let result = delete_entry(&store, &locks, ann.entry_id).await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        assert!(store.find_by_id(ann.entry_id).await.is_err());
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 90, 2), ("Cy".to_string(), 80, 3)]
        );

        recompute_ranks(&store, LeaderboardType::Students).await.unwrap();
        assert_eq!(
            standings(&store, LeaderboardType::Students).await,
            vec![("Bo".to_string(), 90, 1), ("Cy".to_string(), 80, 2)]
        );
    }

    #[tokio::test]
    async fn test_single_write_reorder_violates_uniqueness() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let ann = create(&store, &locks, "Ann", 100).await;
        let bo = create(&store, &locks, "Bo", 90).await;

        // Swapping in one batch collides on the first row, which is what the
        // temporary range in `recompute_ranks` avoids.
        let result = store
            .set_ranks(&[(bo.entry_id, 1), (ann.entry_id, 2)])
            .await;

        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
        assert_consistent(&store, LeaderboardType::Students).await;
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_entry_are_not_found() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let missing = Uuid::new_v4();

        let update = update_entry(
            &store,
            &locks,
            missing,
            LeaderboardEntryChanges {
                points: Some(1),
                ..Default::default()
            },
        )
        .await;
        let delete = delete_entry(&store, &locks, missing).await;

        assert!(matches!(update, Err(StorageError::NotFound)));
        assert!(matches!(delete, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_any_write() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();

        let result = create_entry(
            &store,
            &locks,
            new_entry(LeaderboardType::Students, "Ann", -1),
        )
        .await;

        assert!(matches!(result, Err(StorageError::InvalidArgument(_))));
        assert!(store.snapshot().is_empty());
        assert_eq!(store.rank_writes(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_stay_dense() {
        let store = Arc::new(MemoryLeaderboardStore::new());
        let locks = Arc::new(RankLocks::default());

        let points = [40, 90, 10, 90, 70, 55, 20, 100];
        let handles: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let store = Arc::clone(&store);
                let locks = Arc::clone(&locks);
                tokio::spawn(async move {
                    let entry = new_entry(LeaderboardType::Students, &format!("S{}", i), p);
                    create_entry(store.as_ref(), &locks, entry).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_consistent(&store, LeaderboardType::Students).await;
        assert_eq!(
            list_by_partition(store.as_ref(), LeaderboardType::Students)
                .await
                .unwrap()
                .len(),
            points.len()
        );
    }

    #[tokio::test]
    async fn test_mixed_mutation_sequence_keeps_ranks_dense() {
        let store = MemoryLeaderboardStore::new();
        let locks = RankLocks::default();
        let mut ids = Vec::new();
        for (i, points) in [5, 80, 80, 13, 42, 0, 99].into_iter().enumerate() {
            let entry_type = LeaderboardType::ALL[i % 2];
            let created = create_entry(&store, &locks, new_entry(entry_type, "x", points))
                .await
                .unwrap();
            ids.push(created.entry_id);
        }

        update_entry(
            &store,
            &locks,
            ids[0],
            LeaderboardEntryChanges {
                points: Some(1000),
                entry_type: Some(LeaderboardType::Groups),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        delete_entry(&store, &locks, ids[3]).await.unwrap();
        update_entry(
            &store,
            &locks,
            ids[5],
            LeaderboardEntryChanges {
                entry_type: Some(LeaderboardType::Students),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for entry_type in LeaderboardType::ALL {
            assert_consistent(&store, entry_type).await;
        }
    }
}
