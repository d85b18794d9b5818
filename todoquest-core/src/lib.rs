//! Todo Quest Core - Pure domain logic for the quest tracker
//!
//! This crate contains no I/O operations. The state container talks to
//! storage and notifications through the traits in [`store`]; adapters
//! live in consuming crates.

pub mod date;
pub mod error;
pub mod ledger;
pub mod progression;
pub mod query;
pub mod quest;
pub mod state;
pub mod store;

pub use error::{CoreError, Result};
pub use ledger::{Effect, Transition};
pub use progression::{Achievement, AchievementSet, Award, LevelInfo, ProgressionStats, Title, level_from_xp};
pub use query::{FilterMode, QuestQuery, SortMode};
pub use quest::{Difficulty, Priority, Quest, QuestId, QuestPatch};
pub use state::{AppState, Profile, Settings};
pub use store::{Action, Notifier, Persistence, Silent, Store};
