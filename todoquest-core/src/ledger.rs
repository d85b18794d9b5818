//! Quest ledger operations
//!
//! Each operation takes the current state by reference and returns a new
//! state. Effective mutations first store the previous state in the single
//! undo slot. Invalid input (blank text, unknown id) leaves the state as it
//! is and stores no snapshot.

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::progression::{Award, award_completion};
use crate::quest::{Quest, QuestId, QuestPatch};
use crate::state::{AppState, DEFAULT_PLAYER_NAME, UndoSnapshot, validate_color};

pub const TOAST_ADDED: &str = "Quest added.";
pub const TOAST_UPDATED: &str = "Quest updated.";
pub const TOAST_DELETED: &str = "Deleted.";
pub const TOAST_REOPENED: &str = "Marked as active.";
pub const TOAST_RESET: &str = "Reset done.";
pub const TOAST_UNDONE: &str = "Undone.";
pub const TOAST_SETTINGS: &str = "Settings saved.";

/// What an operation did to the state
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// No-op, the state is unchanged
    Unchanged,
    Changed,
    /// A completion was rewarded
    Awarded(Award),
}

/// A new state plus the effect that produced it
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: AppState,
    pub effect: Effect,
}

impl Transition {
    fn unchanged(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            effect: Effect::Unchanged,
        }
    }

    fn changed(state: AppState) -> Self {
        Self {
            state,
            effect: Effect::Changed,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.effect != Effect::Unchanged
    }

    pub fn award(&self) -> Option<&Award> {
        match &self.effect {
            Effect::Awarded(award) => Some(award),
            _ => None,
        }
    }
}

/// Copy of `prev` that carries `prev` itself in the undo slot
///
/// The stored copy has its own slot cleared, so history is one step deep.
fn with_undo(prev: &AppState, label: &str, now: DateTime<Local>) -> AppState {
    let mut stored = prev.clone();
    stored.ui.last_undo = None;

    let mut next = prev.clone();
    next.ui.last_undo = Some(UndoSnapshot {
        label: label.to_string(),
        prev: Box::new(stored),
        at: now,
    });
    next
}

/// Add a quest at the top of the ledger
pub fn add(state: &AppState, text: &str, now: DateTime<Local>) -> Transition {
    let text = text.trim();
    if text.is_empty() {
        tracing::debug!("ignoring add with blank text");
        return Transition::unchanged(state);
    }

    let mut next = with_undo(state, "Undo add", now);
    next.quests.insert(0, Quest::new(text, now));
    next.ui.toast = Some(TOAST_ADDED.to_string());
    Transition::changed(next)
}

/// Replace the supplied fields on a quest
pub fn update(state: &AppState, id: QuestId, patch: &QuestPatch, now: DateTime<Local>) -> Transition {
    if state.get(id).is_none() {
        tracing::debug!(%id, "ignoring update of unknown quest");
        return Transition::unchanged(state);
    }

    let mut next = with_undo(state, "Undo edit", now);
    if let Some(quest) = next.quests.iter_mut().find(|q| q.id == id) {
        patch.apply_to(quest);
    }
    next.ui.toast = Some(TOAST_UPDATED.to_string());
    Transition::changed(next)
}

/// Remove a quest
pub fn delete(state: &AppState, id: QuestId, now: DateTime<Local>) -> Transition {
    if state.get(id).is_none() {
        tracing::debug!(%id, "ignoring delete of unknown quest");
        return Transition::unchanged(state);
    }

    let mut next = with_undo(state, "Undo delete", now);
    next.quests.retain(|q| q.id != id);
    next.ui.toast = Some(TOAST_DELETED.to_string());
    Transition::changed(next)
}

/// Flip a quest between open and done
///
/// Completing awards XP. Reopening never takes rewards back.
pub fn toggle_completion(state: &AppState, id: QuestId, now: DateTime<Local>) -> Transition {
    let Some(quest) = state.get(id) else {
        tracing::debug!(%id, "ignoring toggle of unknown quest");
        return Transition::unchanged(state);
    };

    if quest.done {
        let mut next = with_undo(state, "Undo uncomplete", now);
        if let Some(quest) = next.quests.iter_mut().find(|q| q.id == id) {
            quest.reopen();
        }
        next.ui.toast = Some(TOAST_REOPENED.to_string());
        return Transition::changed(next);
    }

    let base_xp = quest.difficulty.base_xp();
    let done_today_before = state.done_today_count(now);

    let mut next = with_undo(state, "Undo complete", now);
    if let Some(quest) = next.quests.iter_mut().find(|q| q.id == id) {
        quest.complete(now);
    }

    let award = award_completion(
        &state.stats,
        &state.achievements,
        done_today_before,
        base_xp,
        now,
    );
    next.stats = award.stats.clone();
    next.achievements = award.achievements.clone();
    next.profile.set_title(award.title);
    next.ui.toast = Some(award.message());

    tracing::debug!(
        %id,
        gained = award.gained(),
        streak = award.stats.streak_days,
        "quest completed"
    );

    Transition {
        state: next,
        effect: Effect::Awarded(award),
    }
}

/// Restore the state stored in the undo slot
pub fn undo(state: &AppState) -> Transition {
    let Some(snapshot) = &state.ui.last_undo else {
        return Transition::unchanged(state);
    };

    let mut restored = (*snapshot.prev).clone();
    restored.ui.last_undo = None;
    restored.ui.toast = Some(TOAST_UNDONE.to_string());
    Transition::changed(restored)
}

/// Replace everything with a fresh default state, undoable once
pub fn reset_all(state: &AppState, now: DateTime<Local>) -> Transition {
    let mut next = AppState::new(now);
    next.ui.last_undo = with_undo(state, "Undo reset", now).ui.last_undo;
    next.ui.toast = Some(TOAST_RESET.to_string());
    Transition::changed(next)
}

/// Replace everything with a fresh default state, without an undo snapshot
pub fn factory_reset(now: DateTime<Local>) -> Transition {
    Transition::changed(AppState::new(now))
}

/// Save profile and settings fields
///
/// A blank name falls back to the default player name. Does not touch the
/// undo slot.
pub fn save_settings(
    state: &AppState,
    name: &str,
    color: &str,
    sound: bool,
    reduce_motion: bool,
) -> Result<Transition> {
    let color = validate_color(color)?;
    let name = name.trim();

    let mut next = state.clone();
    next.profile.name = if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name.to_string()
    };
    next.profile.color = color;
    next.settings.sound = sound;
    next.settings.reduce_motion = reduce_motion;
    next.ui.toast = Some(TOAST_SETTINGS.to_string());
    Ok(Transition::changed(next))
}
