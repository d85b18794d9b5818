//! Application state aggregate
//!
//! `AppState` is a plain value: every ledger operation returns a new one.
//! This module also rebuilds a state from a persisted JSON snapshot,
//! merging each section against its defaults.

use chrono::{DateTime, Local, TimeDelta};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use crate::date::end_of_day;
use crate::error::{CoreError, Result};
use crate::progression::{AchievementSet, ProgressionStats, Title};
use crate::quest::{Priority, Quest, QuestId};

pub const DEFAULT_PLAYER_NAME: &str = "Player";
pub const DEFAULT_ACCENT_COLOR: &str = "#7c3aed";

// Accent colors are plain six digit hex codes
static COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Invalid color regex pattern")
});

/// Player profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// Derived from the level; only the progression engine writes it
    title: Title,
    pub color: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYER_NAME.to_string(),
            title: Title::Rookie,
            color: DEFAULT_ACCENT_COLOR.to_string(),
        }
    }
}

impl Profile {
    pub fn title(&self) -> Title {
        self.title
    }

    pub(crate) fn set_title(&mut self, title: Title) {
        self.title = title;
    }
}

/// Validate an accent color ("#rrggbb")
pub fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    if COLOR_REGEX.is_match(color) {
        Ok(color.to_lowercase())
    } else {
        Err(CoreError::validation(
            "color",
            format!("'{}' is not a #rrggbb color", color),
        ))
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Emit the XP award cue
    pub sound: bool,
    pub reduce_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound: true,
            reduce_motion: false,
        }
    }
}

/// Single-slot undo entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoSnapshot {
    pub label: String,
    pub prev: Box<AppState>,
    pub at: DateTime<Local>,
}

/// Transient UI fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiState {
    pub toast: Option<String>,
    pub last_undo: Option<UndoSnapshot>,
}

/// The whole application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub profile: Profile,
    pub stats: ProgressionStats,
    pub settings: Settings,
    /// Most recently added first
    pub quests: Vec<Quest>,
    pub achievements: AchievementSet,
    pub ui: UiState,
}

impl AppState {
    /// Freshly constructed default state, including the starter quests
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            profile: Profile::default(),
            stats: ProgressionStats::default(),
            settings: Settings::default(),
            quests: starter_quests(now),
            achievements: AchievementSet::default(),
            ui: UiState::default(),
        }
    }

    /// Rebuild a state from a persisted JSON snapshot
    ///
    /// Each top-level section is merged field by field against its default.
    /// A missing or unparseable snapshot yields the default state.
    pub fn from_persisted(raw: Option<&str>, now: DateTime<Local>) -> Self {
        let Some(raw) = raw else {
            return Self::new(now);
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                tracing::warn!("persisted state is not an object, using defaults");
                return Self::new(now);
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted state is unreadable, using defaults");
                return Self::new(now);
            }
        };

        let defaults = Self::new(now);
        let mut state = Self {
            profile: section(&value, "profile").unwrap_or(defaults.profile),
            stats: section(&value, "stats").unwrap_or(defaults.stats),
            settings: section(&value, "settings").unwrap_or(defaults.settings),
            quests: quest_list(&value, now).unwrap_or(defaults.quests),
            achievements: section(&value, "achievements").unwrap_or(defaults.achievements),
            ui: section(&value, "ui").unwrap_or(defaults.ui),
        };
        state.profile.set_title(Title::for_level(state.stats.level().level));
        state
    }

    /// Serialize the full state for persistence
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::parse_with_source("Failed to serialize state", e))
    }

    /// Get a quest by ID
    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    /// Resolve a quest from a full id or any unique prefix of it
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Quest> {
        let prefix = prefix.trim().to_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(CoreError::validation("id", "Quest id must not be empty"));
        }

        let matches: Vec<&Quest> = self
            .quests
            .iter()
            .filter(|q| q.id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [quest] => Ok(quest),
            [] => Err(CoreError::QuestNotFound(prefix)),
            _ => Err(CoreError::AmbiguousId {
                prefix,
                matches: matches.len(),
            }),
        }
    }

    /// Number of quests not done yet
    pub fn active_count(&self) -> usize {
        self.quests.iter().filter(|q| !q.done).count()
    }

    /// Number of open quests past their due time
    pub fn overdue_count(&self, now: DateTime<Local>) -> usize {
        self.quests.iter().filter(|q| q.is_overdue(now)).count()
    }

    /// Number of quests completed during the calendar day of `now`
    pub fn done_today_count(&self, now: DateTime<Local>) -> usize {
        self.quests
            .iter()
            .filter(|q| q.completed_on_day_of(now))
            .count()
    }

    /// Label of the pending undo, if any
    pub fn undo_label(&self) -> Option<&str> {
        self.ui.last_undo.as_ref().map(|u| u.label.as_str())
    }
}

fn section<T: DeserializeOwned>(root: &Value, key: &str) -> Option<T> {
    let value = root.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(section = key, error = %e, "ignoring unreadable state section");
            None
        }
    }
}

/// Parse the stored quest list entry by entry
///
/// Entries missing an id or creation time get fresh ones; entries that still
/// fail to parse are dropped. Completion fields are brought back in line
/// with `done`.
fn quest_list(root: &Value, now: DateTime<Local>) -> Option<Vec<Quest>> {
    let entries = match root.get("quests")? {
        Value::Array(entries) => entries,
        _ => {
            tracing::warn!("persisted quests are not a list, using defaults");
            return None;
        }
    };

    let quests = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let mut entry = entry.clone();
            if let Value::Object(fields) = &mut entry {
                if !fields.contains_key("id") {
                    fields.insert("id".into(), Value::String(QuestId::new().to_string()));
                }
                if !fields.contains_key("created_at") {
                    fields.insert("created_at".into(), Value::String(now.to_rfc3339()));
                }
            }
            match serde_json::from_value::<Quest>(entry) {
                Ok(mut quest) => {
                    quest.repair_completion();
                    Some(quest)
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "dropping unreadable quest");
                    None
                }
            }
        })
        .collect();
    Some(quests)
}

fn starter_quests(now: DateTime<Local>) -> Vec<Quest> {
    let tomorrow = (now + TimeDelta::days(1)).date_naive();
    vec![
        Quest::new("First quest: write down a task", now)
            .with_due(Some(end_of_day(tomorrow)))
            .with_tags(vec!["start".to_string()])
            .with_notes("Tip: difficulty decides the XP reward."),
        Quest::new("Finish something small and collect XP", now)
            .with_priority(Priority::Low)
            .with_tags(vec!["xp".to_string()])
            .with_notes("Completing on consecutive days builds a streak bonus."),
    ]
}
