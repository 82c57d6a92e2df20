// src/engine/history.rs
//
// Per-form memory of the last committed transform for each image slot.

use super::io::ImageIdentity;
use super::transform::{Point, TransformState};
use std::collections::HashMap;
use std::fmt;

/// Which image slot of the form a session edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Question,
    Option(usize),
    Avatar,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => f.write_str("question"),
            Self::Option(index) => write!(f, "option-{index}"),
            Self::Avatar => f.write_str("avatar"),
        }
    }
}

/// The transform committed by the last successful Apply on a slot, plus the
/// identity of the original image it was made against.
#[derive(Clone, Debug, PartialEq)]
pub struct EditHistoryEntry {
    pub session_key: SessionKey,
    pub source_identity: ImageIdentity,
    pub scale: f64,
    pub rotation_degrees: i32,
    pub pan: Point,
}

impl EditHistoryEntry {
    pub fn new(session_key: SessionKey, source_identity: ImageIdentity, state: &TransformState) -> Self {
        Self {
            session_key,
            source_identity,
            scale: state.scale,
            rotation_degrees: state.rotation_degrees,
            pan: state.pan,
        }
    }

    pub fn transform(&self) -> TransformState {
        TransformState::new(self.scale, self.rotation_degrees, self.pan)
    }
}

/// One store per open form. Holds at most one entry per slot.
#[derive(Clone, Debug, Default)]
pub struct EditHistoryStore {
    entries: HashMap<SessionKey, EditHistoryEntry>,
}

impl EditHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SessionKey) -> Option<&EditHistoryEntry> {
        self.entries.get(&key)
    }

    /// Insert or replace the entry for `key`. The entry's own key is overwritten
    /// so lookups and contents can never disagree.
    pub fn put(&mut self, key: SessionKey, mut entry: EditHistoryEntry) {
        entry.session_key = key;
        self.entries.insert(key, entry);
    }

    pub fn remove(&mut self, key: SessionKey) -> Option<EditHistoryEntry> {
        self.entries.remove(&key)
    }

    /// Drop everything; called when the form is torn down.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Initial transform for a session on `key` showing the image `identity`:
    /// the stored transform if it was made against the same image, else defaults.
    pub fn seed_for(&self, key: SessionKey, identity: &ImageIdentity) -> TransformState {
        match self.get(key) {
            Some(entry) if &entry.source_identity == identity => entry.transform(),
            _ => TransformState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ImageIdentity {
        ImageIdentity::Url(s.to_string())
    }

    #[test]
    fn session_key_display() {
        assert_eq!(SessionKey::Question.to_string(), "question");
        assert_eq!(SessionKey::Option(3).to_string(), "option-3");
        assert_eq!(SessionKey::Avatar.to_string(), "avatar");
    }

    #[test]
    fn seeds_only_for_matching_identity() {
        let mut store = EditHistoryStore::new();
        let state = TransformState::new(1.5, 90, Point::new(10.0, -4.0));
        store.put(
            SessionKey::Question,
            EditHistoryEntry::new(SessionKey::Question, url("https://a/x.png"), &state),
        );

        assert_eq!(store.seed_for(SessionKey::Question, &url("https://a/x.png")), state);
        assert_eq!(
            store.seed_for(SessionKey::Question, &url("https://a/y.png")),
            TransformState::default()
        );
        assert_eq!(
            store.seed_for(SessionKey::Option(0), &url("https://a/x.png")),
            TransformState::default()
        );
    }

    #[test]
    fn one_entry_per_key() {
        let mut store = EditHistoryStore::new();
        let a = TransformState::new(2.0, 0, Point::ZERO);
        let b = TransformState::new(3.0, 180, Point::ZERO);
        store.put(SessionKey::Option(1), EditHistoryEntry::new(SessionKey::Option(1), url("u"), &a));
        // Mismatched embedded key is corrected on insert.
        store.put(SessionKey::Option(1), EditHistoryEntry::new(SessionKey::Avatar, url("u"), &b));
        assert_eq!(store.len(), 1);

        let entry = store.get(SessionKey::Option(1)).unwrap();
        assert_eq!(entry.session_key, SessionKey::Option(1));
        assert_eq!(entry.transform(), b);

        assert!(store.remove(SessionKey::Option(1)).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut store = EditHistoryStore::new();
        let state = TransformState::default();
        store.put(SessionKey::Question, EditHistoryEntry::new(SessionKey::Question, url("q"), &state));
        store.put(SessionKey::Avatar, EditHistoryEntry::new(SessionKey::Avatar, url("a"), &state));
        assert_eq!(store.len(), 2);
        store.clear();
        assert!(store.get(SessionKey::Question).is_none());
    }
}
