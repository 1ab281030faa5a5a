//! Data models for the Lingo application.
//!
//! Field names serialize in camelCase so stored values keep the layout the web front end reads.

mod catalog;
mod contact;
mod leaderboard;
mod progress;
mod user;

pub use catalog::*;
pub use contact::*;
pub use leaderboard::*;
pub use progress::*;
pub use user::*;
