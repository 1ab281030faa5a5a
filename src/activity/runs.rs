//! Live activity runs.
//!
//! Each run owns an [`ActivityEngine`] behind a mutex. Timed runs get a
//! one-second ticker task and, after every answer, a reveal-delay task. Both
//! tasks hold only a weak reference to the run and are owned by the engine, so
//! finishing, abandoning or replacing the run cancels them.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::engine::{Action, ActivityEngine, ActivityView, Completion};
use super::task::ScheduledTask;
use crate::catalog;
use crate::errors::AppError;
use crate::leaderboard::Leaderboard;
use crate::models::{ActivityKind, LearningModule};
use crate::progress::ProgressStore;

/// Timing of the timed challenge.
#[derive(Debug, Clone, Copy)]
pub struct ActivitySettings {
    pub time_limit: Duration,
    pub reveal_delay: Duration,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(60),
            reveal_delay: Duration::from_secs(1),
        }
    }
}

/// Writes finished runs into the progress table and refreshes the leaderboard.
#[derive(Debug, Clone)]
pub struct CompletionRecorder {
    progress: ProgressStore,
    leaderboard: Leaderboard,
}

impl CompletionRecorder {
    pub fn new(progress: ProgressStore, leaderboard: Leaderboard) -> Self {
        Self {
            progress,
            leaderboard,
        }
    }

    pub async fn record(
        &self,
        user_id: Option<&str>,
        completion: &Completion,
    ) -> Result<(), AppError> {
        let Some(user_id) = user_id else {
            tracing::debug!(module_id = %completion.module_id, "Anonymous run finished");
            return Ok(());
        };
        if !completion.should_record() {
            return Ok(());
        }

        self.progress
            .record(user_id, &completion.module_id, completion.percentage)
            .await?;
        self.leaderboard.refresh().await?;
        Ok(())
    }

    /// Record from a scheduled task. The work runs in its own task because the
    /// caller is cancelled as soon as it yields.
    fn record_detached(&self, user_id: Option<String>, completion: Completion) {
        let recorder = self.clone();
        tokio::spawn(async move {
            if let Err(e) = recorder.record(user_id.as_deref(), &completion).await {
                tracing::error!("Failed to record completion: {}", e);
            }
        });
    }
}

/// A run as returned to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunView {
    pub run_id: String,
    #[serde(flatten)]
    pub activity: ActivityView,
}

#[derive(Debug)]
pub struct ActiveRun {
    pub id: String,
    pub user_id: Option<String>,
    engine: Mutex<ActivityEngine>,
}

impl ActiveRun {
    pub async fn view(&self) -> RunView {
        RunView {
            run_id: self.id.clone(),
            activity: self.engine.lock().await.view(),
        }
    }
}

/// Registry of live runs.
#[derive(Debug, Clone)]
pub struct ActivityRuns {
    runs: Arc<RwLock<HashMap<String, Arc<ActiveRun>>>>,
    recorder: CompletionRecorder,
    settings: ActivitySettings,
}

impl ActivityRuns {
    pub fn new(recorder: CompletionRecorder, settings: ActivitySettings) -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            recorder,
            settings,
        }
    }

    /// Start `module` for `user_id`, abandoning that user's earlier runs.
    ///
    /// Anonymous runs never replace each other.
    pub async fn start(
        &self,
        user_id: Option<String>,
        module: &LearningModule,
    ) -> Result<RunView, AppError> {
        let items = catalog::items_for(module.activity);
        let engine = if module.activity == ActivityKind::Flashcards {
            ActivityEngine::shuffled(
                &module.id,
                module.activity,
                items,
                self.settings.time_limit,
                &mut rand::thread_rng(),
            )
        } else {
            ActivityEngine::new(&module.id, module.activity, items, self.settings.time_limit)
        };
        let finished_at_start = engine.completion();
        let timed = engine.config().timed && finished_at_start.is_none();

        let run = Arc::new(ActiveRun {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            engine: Mutex::new(engine),
        });

        if timed {
            let ticker = self.spawn_ticker(&run);
            run.engine.lock().await.attach_ticker(ticker);
        }

        let replaced = {
            let mut runs = self.runs.write().await;
            let stale: Vec<String> = runs
                .values()
                .filter(|r| run.user_id.is_some() && r.user_id == run.user_id)
                .map(|r| r.id.clone())
                .collect();
            let replaced: Vec<Arc<ActiveRun>> =
                stale.iter().filter_map(|id| runs.remove(id)).collect();
            runs.insert(run.id.clone(), run.clone());
            replaced
        };
        for old in replaced {
            old.engine.lock().await.release_tasks();
        }

        tracing::info!(run_id = %run.id, module_id = %module.id, "Activity run started");

        if let Some(completion) = finished_at_start {
            self.recorder
                .record(run.user_id.as_deref(), &completion)
                .await?;
        }

        Ok(run.view().await)
    }

    pub async fn get(&self, run_id: &str) -> Result<Arc<ActiveRun>, AppError> {
        self.runs
            .read()
            .await
            .get(run_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Run {} not found", run_id)))
    }

    /// Apply learner input to a run.
    pub async fn act(&self, run_id: &str, action: Action) -> Result<RunView, AppError> {
        let run = self.get(run_id).await?;

        let (completion, view) = {
            let mut engine = run.engine.lock().await;
            let completion = engine.apply(action)?;
            if engine.needs_advance() {
                let task = self.spawn_advance(&run);
                engine.schedule_advance(task);
            }
            let view = RunView {
                run_id: run.id.clone(),
                activity: engine.view(),
            };
            (completion, view)
        };

        if let Some(completion) = completion {
            self.recorder
                .record(run.user_id.as_deref(), &completion)
                .await?;
        }

        Ok(view)
    }

    /// Drop a run and cancel its scheduled tasks.
    pub async fn abandon(&self, run_id: &str) -> Result<(), AppError> {
        let run = self
            .runs
            .write()
            .await
            .remove(run_id)
            .ok_or_else(|| AppError::NotFound(format!("Run {} not found", run_id)))?;

        run.engine.lock().await.release_tasks();
        tracing::info!(run_id, "Activity run abandoned");
        Ok(())
    }

    fn spawn_ticker(&self, run: &Arc<ActiveRun>) -> ScheduledTask {
        let weak: Weak<ActiveRun> = Arc::downgrade(run);
        let recorder = self.recorder.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(run) = weak.upgrade() else {
                    break;
                };
                let outcome = run.engine.lock().await.tick();
                match outcome {
                    Ok(None) => continue,
                    Ok(Some(completion)) => {
                        tracing::info!(run_id = %run.id, "Time is up");
                        recorder.record_detached(run.user_id.clone(), completion);
                        break;
                    }
                    Err(_) => break,
                }
            }
        });

        ScheduledTask::new(handle.abort_handle())
    }

    fn spawn_advance(&self, run: &Arc<ActiveRun>) -> ScheduledTask {
        let weak: Weak<ActiveRun> = Arc::downgrade(run);
        let recorder = self.recorder.clone();
        let delay = self.settings.reveal_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(run) = weak.upgrade() else {
                return;
            };
            let outcome = run.engine.lock().await.advance();
            if let Ok(Some(completion)) = outcome {
                recorder.record_detached(run.user_id.clone(), completion);
            }
        });

        ScheduledTask::new(handle.abort_handle())
    }
}
