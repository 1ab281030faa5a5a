//! Learning activities: the shared state machine and the registry of live runs.

mod engine;
mod runs;
mod task;

pub use engine::Action;
pub use runs::{ActivityRuns, ActivitySettings, CompletionRecorder, RunView};
