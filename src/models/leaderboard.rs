//! Leaderboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's standing, derived from their progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    /// Average percentage across completed modules, rounded
    pub score: u32,
    pub modules_completed: usize,
    pub last_updated: DateTime<Utc>,
}

/// A leaderboard entry annotated for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// 1-based position
    pub rank: usize,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub is_current_user: bool,
}
