//! Application state container
//!
//! Owns the single `AppState`, routes actions through the ledger and
//! publishes every new state to the persistence and notification
//! collaborators. Collaborator failures are logged and never returned.

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::ledger::{self, Transition};
use crate::progression::Award;
use crate::quest::{QuestId, QuestPatch};
use crate::state::AppState;

/// Durable storage for serialized state snapshots
pub trait Persistence {
    type Error: std::error::Error;

    /// Previously stored snapshot, if any
    fn load(&self) -> std::result::Result<Option<String>, Self::Error>;

    /// Store a full snapshot
    fn save(&self, snapshot: &str) -> std::result::Result<(), Self::Error>;
}

/// Receivers of fire-and-forget feedback
pub trait Notifier {
    /// A completion was rewarded and the sound setting is on
    fn xp_awarded(&self, _award: &Award) {}

    /// A mutation produced a message to show briefly
    fn toast(&self, _message: &str) {}
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {}

/// A user action the container can apply
#[derive(Debug, Clone)]
pub enum Action {
    Add(String),
    Update(QuestId, QuestPatch),
    Delete(QuestId),
    ToggleCompletion(QuestId),
    Undo,
    ResetAll,
    FactoryReset,
}

/// Container owning the application state
pub struct Store<P: Persistence, N: Notifier = Silent> {
    state: AppState,
    persistence: P,
    notifier: N,
}

impl<P: Persistence, N: Notifier> Store<P, N> {
    /// Load the stored state, falling back to defaults
    pub fn open(persistence: P, notifier: N, now: DateTime<Local>) -> Self {
        let raw = match persistence.load() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load stored state, starting fresh");
                None
            }
        };
        let state = AppState::from_persisted(raw.as_deref(), now);
        Self {
            state,
            persistence,
            notifier,
        }
    }

    /// Current state, read-only
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Apply an action at `now` and publish the result
    pub fn dispatch(&mut self, action: Action, now: DateTime<Local>) -> Transition {
        let transition = match action {
            Action::Add(text) => ledger::add(&self.state, &text, now),
            Action::Update(id, patch) => ledger::update(&self.state, id, &patch, now),
            Action::Delete(id) => ledger::delete(&self.state, id, now),
            Action::ToggleCompletion(id) => ledger::toggle_completion(&self.state, id, now),
            Action::Undo => ledger::undo(&self.state),
            Action::ResetAll => ledger::reset_all(&self.state, now),
            Action::FactoryReset => ledger::factory_reset(now),
        };
        self.publish(&transition);
        transition
    }

    /// Save profile and settings
    pub fn save_settings(
        &mut self,
        name: &str,
        color: &str,
        sound: bool,
        reduce_motion: bool,
    ) -> Result<Transition> {
        let transition = ledger::save_settings(&self.state, name, color, sound, reduce_motion)?;
        self.publish(&transition);
        Ok(transition)
    }

    /// Replace the current state wholesale, e.g. after recovering a backup
    pub fn replace(&mut self, mut state: AppState) {
        state.ui.toast = None;
        let transition = Transition {
            state,
            effect: ledger::Effect::Changed,
        };
        self.publish(&transition);
    }

    fn publish(&mut self, transition: &Transition) {
        if !transition.is_changed() {
            return;
        }

        self.state = transition.state.clone();
        self.persist();

        if let Some(award) = transition.award()
            && self.state.settings.sound
        {
            self.notifier.xp_awarded(award);
        }
        if let Some(message) = &self.state.ui.toast {
            self.notifier.toast(message);
        }
    }

    /// Best-effort write of the current state
    fn persist(&self) {
        let snapshot = match self.state.to_json() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize state");
                return;
            }
        };
        if let Err(e) = self.persistence.save(&snapshot) {
            tracing::warn!(error = %e, "failed to persist state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::io;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().unwrap()
    }

    #[derive(Default)]
    struct MemoryStore {
        stored: RefCell<Option<String>>,
        fail_writes: bool,
    }

    impl Persistence for MemoryStore {
        type Error = io::Error;

        fn load(&self) -> std::result::Result<Option<String>, io::Error> {
            Ok(self.stored.borrow().clone())
        }

        fn save(&self, snapshot: &str) -> std::result::Result<(), io::Error> {
            if self.fail_writes {
                return Err(io::Error::other("disk full"));
            }
            *self.stored.borrow_mut() = Some(snapshot.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        awards: RefCell<Vec<u64>>,
        toasts: RefCell<Vec<String>>,
    }

    impl Notifier for &Recorder {
        fn xp_awarded(&self, award: &Award) {
            self.awards.borrow_mut().push(award.gained());
        }

        fn toast(&self, message: &str) {
            self.toasts.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn test_open_without_stored_state() {
        let store = Store::open(MemoryStore::default(), Silent, now());
        assert_eq!(store.state().quests.len(), 2);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut store = Store::open(MemoryStore::default(), Silent, now());
        store.dispatch(Action::Add("Water plants".into()), now());

        let raw = store.persistence().stored.borrow().clone().unwrap();
        let reloaded = AppState::from_persisted(Some(&raw), now());
        assert_eq!(&reloaded, store.state());
    }

    #[test]
    fn test_noop_is_not_persisted_or_announced() {
        let recorder = Recorder::default();
        let mut store = Store::open(MemoryStore::default(), &recorder, now());

        let t = store.dispatch(Action::Add("   ".into()), now());
        assert!(!t.is_changed());
        assert!(store.persistence().stored.borrow().is_none());
        assert!(recorder.toasts.borrow().is_empty());
    }

    #[test]
    fn test_completion_notifies() {
        let recorder = Recorder::default();
        let mut store = Store::open(MemoryStore::default(), &recorder, now());
        let id = store.state().quests[0].id;

        store.dispatch(Action::ToggleCompletion(id), now());

        assert_eq!(*recorder.awards.borrow(), vec![15]);
        assert_eq!(
            *recorder.toasts.borrow(),
            vec!["+15 XP (base 10 + bonus 5)".to_string()]
        );
    }

    #[test]
    fn test_sound_off_suppresses_award_cue() {
        let recorder = Recorder::default();
        let mut store = Store::open(MemoryStore::default(), &recorder, now());
        let color = store.state().profile.color.clone();
        store.save_settings("Mira", &color, false, false).unwrap();
        let id = store.state().quests[0].id;

        store.dispatch(Action::ToggleCompletion(id), now());

        assert!(recorder.awards.borrow().is_empty());
        assert_eq!(recorder.toasts.borrow().len(), 2);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let persistence = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut store = Store::open(persistence, Silent, now());

        let t = store.dispatch(Action::Add("Still works".into()), now());
        assert!(t.is_changed());
        assert_eq!(store.state().quests[0].text, "Still works");
    }

    #[test]
    fn test_undo_through_store() {
        let mut store = Store::open(MemoryStore::default(), Silent, now());
        let before = store.state().quests.clone();

        store.dispatch(Action::Add("temp".into()), now());
        store.dispatch(Action::Undo, now());

        assert_eq!(store.state().quests, before);
        assert_eq!(store.state().ui.toast.as_deref(), Some("Undone."));
    }
}
