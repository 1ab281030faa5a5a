//! Scheduled-task ownership.

use tokio::task::AbortHandle;

/// A spawned tokio task that is aborted when this value is dropped.
///
/// Whoever holds the guard owns the task: releasing the guard on any path
/// (replacement, `Option::take`, drop of the owner) cancels it.
#[derive(Debug)]
pub struct ScheduledTask(AbortHandle);

impl ScheduledTask {
    pub fn new(handle: AbortHandle) -> Self {
        Self(handle)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}
