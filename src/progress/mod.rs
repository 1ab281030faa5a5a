//! Per-user, per-module activity results over the `userProgress` key.

use std::sync::Arc;

use chrono::Utc;

use crate::catalog;
use crate::errors::AppError;
use crate::models::{ActivityResult, Profile, ProfileModule, ProgressTable, SessionUser, UserProgress};
use crate::scoring;
use crate::store::{self, keys, KeyValueStore};

#[derive(Debug, Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The whole progress table.
    pub async fn all(&self) -> Result<ProgressTable, AppError> {
        store::read(self.store.as_ref(), keys::USER_PROGRESS).await
    }

    /// Results of one user, empty if they have none.
    pub async fn get(&self, user_id: &str) -> Result<UserProgress, AppError> {
        Ok(self.all().await?.remove(user_id).unwrap_or_default())
    }

    /// Upsert the result for `(user_id, module_id)`, overwriting any earlier one.
    pub async fn record(
        &self,
        user_id: &str,
        module_id: &str,
        score: u32,
    ) -> Result<ActivityResult, AppError> {
        if score > 100 {
            return Err(AppError::field("score", "Score must be between 0 and 100"));
        }

        let result = store::update(
            self.store.as_ref(),
            keys::USER_PROGRESS,
            |table: &mut ProgressTable| {
                let result = ActivityResult {
                    module_id: module_id.to_string(),
                    score,
                    completed: true,
                    date: Utc::now(),
                };
                table
                    .entry(user_id.to_string())
                    .or_default()
                    .insert(module_id.to_string(), result.clone());
                Ok(result)
            },
        )
        .await?;

        tracing::info!(user_id, module_id, score, "Recorded activity result");
        Ok(result)
    }

    /// Profile statistics for the session user.
    pub async fn profile(&self, user: SessionUser) -> Result<Profile, AppError> {
        let results = self.get(&user.id).await?;

        let total_score = results.values().map(|r| r.score).sum();
        let average_score = scoring::average(results.values().map(|r| r.score));
        let progress = results
            .values()
            .map(|r| ProfileModule {
                module_id: r.module_id.clone(),
                module_name: catalog::module_name(&r.module_id),
                score: r.score,
                date: r.date,
            })
            .collect();

        Ok(Profile {
            user,
            modules_completed: results.len(),
            average_score,
            total_score,
            progress,
        })
    }
}
