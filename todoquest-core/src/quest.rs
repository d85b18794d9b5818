//! Quest domain model
//!
//! Pure domain logic for a single quest with no I/O operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Maximum number of tags kept on a quest after an edit
pub const MAX_TAGS: usize = 12;

/// Newtype wrapper for quest IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(Uuid);

impl QuestId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        QuestId(Uuid::new_v4())
    }

    /// Short form used when listing quests
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for QuestId {
    fn from(id: Uuid) -> Self {
        QuestId(id)
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Quest priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Weight used by the ranking engine
    pub fn weight(self) -> i64 {
        match self {
            Priority::High => 3,
            Priority::Normal => 2,
            Priority::Low => 1,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
        }
    }

    /// Lenient parse used for persisted data; unknown values become `Normal`
    fn from_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(CoreError::parse(format!(
                "Unknown priority '{}' (expected low, normal or high)",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::from_lossy(&raw))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Quest difficulty, which determines the XP reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Base XP awarded on completion
    pub fn base_xp(self) -> u64 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 40,
        }
    }

    /// Weight used by the ranking engine
    pub fn weight(self) -> i64 {
        match self {
            Difficulty::Hard => 6,
            Difficulty::Medium => 3,
            Difficulty::Easy => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Lenient parse used for persisted data; unknown values become `Easy`,
    /// which is also the 10 XP fallback reward
    fn from_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(CoreError::parse(format!(
                "Unknown difficulty '{}' (expected easy, medium or hard)",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Difficulty::from_lossy(&raw))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single quest
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quest {
    pub id: QuestId,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Local>,
    /// Set exactly while `done` is true
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    /// End of the due day, None = no deadline
    #[serde(default)]
    pub due_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl Quest {
    /// Create a new open quest with default metadata
    pub fn new(text: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            id: QuestId::new(),
            text: text.into(),
            done: false,
            created_at: now,
            completed_at: None,
            due_at: None,
            priority: Priority::Normal,
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
            notes: String::new(),
        }
    }

    /// Builder method to set the due timestamp
    pub fn with_due(mut self, due_at: Option<DateTime<Local>>) -> Self {
        self.due_at = due_at;
        self
    }

    /// Builder method to set priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder method to set difficulty
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder method to set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder method to set notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Mark as completed at `now`
    pub fn complete(&mut self, now: DateTime<Local>) {
        self.done = true;
        self.completed_at = Some(now);
    }

    /// Mark as active again
    pub fn reopen(&mut self) {
        self.done = false;
        self.completed_at = None;
    }

    /// Restore `completed_at` being set exactly while done
    ///
    /// A done quest without a completion time is treated as completed when
    /// it was created.
    pub fn repair_completion(&mut self) {
        match (self.done, self.completed_at) {
            (true, None) => self.completed_at = Some(self.created_at),
            (false, Some(_)) => self.completed_at = None,
            _ => {}
        }
    }

    /// Not done and past its due timestamp
    pub fn is_overdue(&self, now: DateTime<Local>) -> bool {
        !self.done && self.due_at.is_some_and(|due| due < now)
    }

    /// Completed at some point during the calendar day of `now`
    pub fn completed_on_day_of(&self, now: DateTime<Local>) -> bool {
        self.done
            && self
                .completed_at
                .is_some_and(|at| at.date_naive() == now.date_naive())
    }

    /// Text searched by the query engine: text, notes and tags joined by spaces
    pub fn haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.text, &self.notes];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Clean a list of raw tags: trim, strip a leading `#`, drop empties, cap at [`MAX_TAGS`]
pub fn clean_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|t| t.as_ref().trim().trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect()
}

/// Parse a comma separated tag input ("kita, #eltern, papierkram")
pub fn parse_tags(input: &str) -> Vec<String> {
    clean_tags(input.split(','))
}

/// Partial update of a quest; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct QuestPatch {
    pub text: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub difficulty: Option<Difficulty>,
    /// `Some(None)` clears the due date
    pub due_at: Option<Option<DateTime<Local>>>,
    pub tags: Option<Vec<String>>,
}

impl QuestPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn due_at(mut self, due_at: Option<DateTime<Local>>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.notes.is_none()
            && self.priority.is_none()
            && self.difficulty.is_none()
            && self.due_at.is_none()
            && self.tags.is_none()
    }

    /// Apply the supplied fields to a quest
    ///
    /// Blank text keeps the previous text; tags are cleaned and capped.
    pub fn apply_to(&self, quest: &mut Quest) {
        if let Some(text) = &self.text {
            let text = text.trim();
            if !text.is_empty() {
                quest.text = text.to_string();
            }
        }
        if let Some(notes) = &self.notes {
            quest.notes = notes.clone();
        }
        if let Some(priority) = self.priority {
            quest.priority = priority;
        }
        if let Some(difficulty) = self.difficulty {
            quest.difficulty = difficulty;
        }
        if let Some(due_at) = self.due_at {
            quest.due_at = due_at;
        }
        if let Some(tags) = &self.tags {
            quest.tags = clean_tags(tags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_quest_creation() {
        let quest = Quest::new("Write report", now());

        assert_eq!(quest.text, "Write report");
        assert!(!quest.done);
        assert!(quest.completed_at.is_none());
        assert!(quest.due_at.is_none());
        assert_eq!(quest.priority, Priority::Normal);
        assert_eq!(quest.difficulty, Difficulty::Easy);
        assert!(quest.tags.is_empty());
        assert!(quest.notes.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Quest::new("a", now());
        let b = Quest::new("b", now());
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.short().len(), 8);
        assert!(a.id.to_string().starts_with(&a.id.short()));
    }

    #[test]
    fn test_complete_and_reopen_keep_invariant() {
        let mut quest = Quest::new("Test", now());

        quest.complete(now());
        assert!(quest.done);
        assert_eq!(quest.completed_at, Some(now()));

        quest.reopen();
        assert!(!quest.done);
        assert!(quest.completed_at.is_none());
    }

    #[test]
    fn test_overdue() {
        let quest = Quest::new("Late", now()).with_due(Some(now() - TimeDelta::hours(1)));
        assert!(quest.is_overdue(now()));

        let mut done = quest.clone();
        done.complete(now());
        assert!(!done.is_overdue(now()));

        let open = Quest::new("No deadline", now());
        assert!(!open.is_overdue(now()));
    }

    #[test]
    fn test_difficulty_rewards() {
        assert_eq!(Difficulty::Easy.base_xp(), 10);
        assert_eq!(Difficulty::Medium.base_xp(), 20);
        assert_eq!(Difficulty::Hard.base_xp(), 40);
    }

    #[test]
    fn test_unknown_persisted_values_fall_back() {
        let difficulty: Difficulty = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(difficulty, Difficulty::Easy);
        assert_eq!(difficulty.base_xp(), 10);

        let priority: Priority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(priority, Priority::Normal);

        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
    }

    #[test]
    fn test_repair_completion() {
        let mut quest = Quest::new("Stale", now());
        quest.done = true;
        quest.repair_completion();
        assert_eq!(quest.completed_at, Some(quest.created_at));

        quest.done = false;
        quest.repair_completion();
        assert!(quest.completed_at.is_none());

        quest.complete(now());
        quest.repair_completion();
        assert_eq!(quest.completed_at, Some(now()));
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(" kita, #eltern,, papierkram ,#");
        assert_eq!(tags, vec!["kita", "eltern", "papierkram"]);

        let many: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        assert_eq!(clean_tags(&many).len(), MAX_TAGS);
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut quest = Quest::new("Original", now()).with_notes("keep me");

        QuestPatch::new()
            .priority(Priority::High)
            .tags(vec!["#work".to_string(), "work".to_string()])
            .apply_to(&mut quest);

        assert_eq!(quest.text, "Original");
        assert_eq!(quest.notes, "keep me");
        assert_eq!(quest.priority, Priority::High);
        assert_eq!(quest.tags, vec!["work", "work"]);
    }

    #[test]
    fn test_patch_ignores_blank_text() {
        let mut quest = Quest::new("Original", now());
        QuestPatch::new().text("   ").apply_to(&mut quest);
        assert_eq!(quest.text, "Original");

        QuestPatch::new().text("  Renamed ").apply_to(&mut quest);
        assert_eq!(quest.text, "Renamed");
    }

    #[test]
    fn test_haystack_joins_text_notes_tags() {
        let quest = Quest::new("Buy milk", now())
            .with_notes("oat")
            .with_tags(vec!["shop".into(), "home".into()]);
        assert_eq!(quest.haystack(), "Buy milk oat shop home");
    }
}
