//! Leaderboard aggregation over the `leaderboard` key.
//!
//! The table is derived data. It is rebuilt from the user directory and the
//! full progress table each time, both after an activity completes and when
//! the leaderboard is viewed, so the two triggers always agree.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{LeaderboardEntry, LeaderboardRow, ProgressTable, User, UserProgress};
use crate::progress::ProgressStore;
use crate::scoring;
use crate::store::{self, keys, KeyValueStore};
use crate::users::UserDirectory;

/// Default number of ranked entries.
pub const DEFAULT_SIZE: usize = 10;

/// Build one user's entry from their results.
///
/// `last_updated` is the date of the user's most recent result so that
/// rebuilding from unchanged data yields an identical entry.
pub fn entry_for(user: &User, results: &UserProgress) -> LeaderboardEntry {
    LeaderboardEntry {
        user_id: user.id.clone(),
        name: user.name.clone(),
        score: scoring::average(results.values().map(|r| r.score)),
        modules_completed: results.len(),
        last_updated: results
            .values()
            .map(|r| r.date)
            .max()
            .unwrap_or(user.created_at),
    }
}

/// Rank every user that has a progress record.
///
/// Entries of `existing` are updated in place or appended to. Users missing
/// from the directory are skipped, and so are stale entries that no longer
/// match a progress record. The result is sorted by score descending, ties
/// broken by user id, and truncated to `limit`.
pub fn recompute(
    existing: Vec<LeaderboardEntry>,
    users: &[User],
    progress: &ProgressTable,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut table: Vec<LeaderboardEntry> = existing
        .into_iter()
        .filter(|e| progress.contains_key(&e.user_id))
        .collect();

    for (user_id, results) in progress {
        let Some(user) = users.iter().find(|u| &u.id == user_id) else {
            continue;
        };
        let entry = entry_for(user, results);
        match table.iter_mut().find(|e| &e.user_id == user_id) {
            Some(slot) => *slot = entry,
            None => table.push(entry),
        }
    }

    table.retain(|e| users.iter().any(|u| u.id == e.user_id));
    table.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.user_id.cmp(&b.user_id)));
    table.truncate(limit);
    table
}

/// Annotate a ranked table for display.
pub fn rows(table: Vec<LeaderboardEntry>, current_user: Option<&str>) -> Vec<LeaderboardRow> {
    table
        .into_iter()
        .enumerate()
        .map(|(i, entry)| LeaderboardRow {
            rank: i + 1,
            is_current_user: current_user == Some(entry.user_id.as_str()),
            entry,
        })
        .collect()
}

/// Persisted leaderboard.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    store: Arc<dyn KeyValueStore>,
    users: UserDirectory,
    progress: ProgressStore,
    limit: usize,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self {
            users: UserDirectory::new(store.clone()),
            progress: ProgressStore::new(store.clone()),
            store,
            limit,
        }
    }

    /// The stored table, as last computed.
    pub async fn table(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        store::read(self.store.as_ref(), keys::LEADERBOARD).await
    }

    /// Recompute from current data and persist.
    ///
    /// Holds the store's writer lock from the first read to the write.
    pub async fn refresh(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let _writer = self.store.writer().lock().await;

        let existing = self.table().await?;
        let users = self.users.list().await?;
        let progress = self.progress.all().await?;

        let table = recompute(existing, &users, &progress, self.limit);
        store::write(self.store.as_ref(), keys::LEADERBOARD, &table).await?;

        tracing::debug!(entries = table.len(), "Leaderboard recomputed");
        Ok(table)
    }
}
