//! Progress models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionUser;

/// Outcome of the latest completed run of one module by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub module_id: String,
    /// Integer percentage, 0 to 100
    pub score: u32,
    pub completed: bool,
    pub date: DateTime<Utc>,
}

/// One user's results keyed by module id.
pub type UserProgress = BTreeMap<String, ActivityResult>;

/// Every user's results keyed by user id.
pub type ProgressTable = BTreeMap<String, UserProgress>;

/// A module result as shown on the profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileModule {
    pub module_id: String,
    pub module_name: String,
    pub score: u32,
    pub date: DateTime<Utc>,
}

/// Profile statistics of the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: SessionUser,
    pub modules_completed: usize,
    pub average_score: u32,
    pub total_score: u32,
    pub progress: Vec<ProfileModule>,
}
