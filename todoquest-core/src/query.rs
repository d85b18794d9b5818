//! Quest filtering and ranking
//!
//! Provides a builder-style API for filtering, searching and sorting quests.
//! Queries are read-only and recomputed from scratch on every call.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeDelta};

use crate::date::{start_of_day, start_of_tomorrow};
use crate::error::{CoreError, Result};
use crate::quest::Quest;

/// Which quests to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Done,
    /// Due some time today
    DueToday,
    /// Open and past due
    Overdue,
}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Done => "done",
            FilterMode::DueToday => "today",
            FilterMode::Overdue => "overdue",
        }
    }
}

impl FromStr for FilterMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "done" => Ok(FilterMode::Done),
            "today" | "due-today" | "duetoday" => Ok(FilterMode::DueToday),
            "overdue" => Ok(FilterMode::Overdue),
            other => Err(CoreError::parse(format!("Unknown filter '{}'", other))),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for quests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Weighted relevance, see [`smart_score`]
    #[default]
    Smart,
    Due,
    Priority,
    Created,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Smart => "smart",
            SortMode::Due => "due",
            SortMode::Priority => "priority",
            SortMode::Created => "created",
        }
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "smart" => Ok(SortMode::Smart),
            "due" => Ok(SortMode::Due),
            "priority" => Ok(SortMode::Priority),
            "created" | "newest" => Ok(SortMode::Created),
            other => Err(CoreError::parse(format!("Unknown sort '{}'", other))),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra score for how close a quest is to its deadline
pub fn due_urgency_bonus(quest: &Quest, now: DateTime<Local>) -> i64 {
    let Some(due) = quest.due_at else {
        return 0;
    };
    let delta = due - now;
    if delta < TimeDelta::zero() {
        40
    } else if delta < TimeDelta::hours(24) {
        25
    } else if delta < TimeDelta::days(3) {
        15
    } else {
        0
    }
}

/// Relevance score used by [`SortMode::Smart`]
///
/// `(open ? 50 : 0) + priority * 10 + urgency + difficulty`
pub fn smart_score(quest: &Quest, now: DateTime<Local>) -> i64 {
    let open = if quest.done { 0 } else { 50 };
    open + quest.priority.weight() * 10 + due_urgency_bonus(quest, now) + quest.difficulty.weight()
}

/// Due date sort key; quests without a due date go last
fn due_key(quest: &Quest) -> (bool, Option<DateTime<Local>>) {
    (quest.due_at.is_none(), quest.due_at)
}

/// Builder for quest queries
#[derive(Debug, Clone, Default)]
pub struct QuestQuery {
    pub filter: FilterMode,
    /// Search term (case-insensitive) over text, notes and tags
    pub search: Option<String>,
    pub sort: SortMode,
}

impl QuestQuery {
    /// Create a new query with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set filter mode
    pub fn filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Filter by search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Set search term
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = term;
        self
    }

    /// Sort by given mode
    pub fn sort_by(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Check if a quest matches the filter mode and search term
    pub fn matches(&self, quest: &Quest, now: DateTime<Local>) -> bool {
        let mode_ok = match self.filter {
            FilterMode::All => true,
            FilterMode::Active => !quest.done,
            FilterMode::Done => quest.done,
            FilterMode::DueToday => {
                let (start, end) = (start_of_day(now), start_of_tomorrow(now));
                quest.due_at.is_some_and(|due| due >= start && due < end)
            }
            FilterMode::Overdue => quest.is_overdue(now),
        };
        if !mode_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => quest
                .haystack()
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Apply filter and sort to quests; sorting is stable
    pub fn apply<'a>(
        &self,
        quests: impl IntoIterator<Item = &'a Quest>,
        now: DateTime<Local>,
    ) -> Vec<&'a Quest> {
        let mut filtered: Vec<&Quest> = quests
            .into_iter()
            .filter(|q| self.matches(q, now))
            .collect();

        match self.sort {
            SortMode::Smart => filtered.sort_by_key(|q| Reverse(smart_score(q, now))),
            SortMode::Due => filtered.sort_by_key(|q| due_key(q)),
            SortMode::Priority => {
                filtered.sort_by_key(|q| (Reverse(q.priority.weight()), due_key(q)))
            }
            SortMode::Created => filtered.sort_by_key(|q| Reverse(q.created_at)),
        }

        filtered
    }
}
