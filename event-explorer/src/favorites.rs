//! Saved events
//!
//! Mutations are pure; the app writes the slice back to storage after each
//! one via [`FavoritesState::persist`].

use std::collections::HashSet;

use crate::catalog::Event;
use crate::storage::{self, keys, KeyValueStore};

/// Ordered, id-unique list of favorited events
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FavoritesState {
    items: Vec<Event>,
}

impl FavoritesState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, keeping the first occurrence of each id
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut seen = HashSet::new();
        let items = events
            .into_iter()
            .filter(|event| seen.insert(event.id.clone()))
            .collect();
        Self { items }
    }

    /// Restore from storage. Missing or unreadable data is an empty list.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let events: Vec<Event> = storage::load_json(store, keys::FAVORITES).unwrap_or_default();
        let state = Self::from_events(events);
        tracing::debug!(count = state.len(), "loaded favorites");
        state
    }

    /// Write the full list under `favorites`. Failures are logged.
    pub fn persist(&self, store: &dyn KeyValueStore) -> bool {
        storage::save_json(store, keys::FAVORITES, &self.items)
    }

    /// Remove the persisted list entirely
    pub fn forget(store: &dyn KeyValueStore) -> bool {
        storage::remove(store, keys::FAVORITES)
    }

    /// Remove the event if an entry with its id exists, otherwise append it.
    /// Returns whether the event is a favorite afterwards.
    pub fn toggle(&mut self, event: Event) -> bool {
        match self.position(&event.id) {
            Some(index) => {
                self.items.remove(index);
                false
            }
            None => {
                self.items.push(event);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|event| event.id == id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.items.iter().find(|event| event.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn event(id: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Event {id}"),
            "dates": { "start": { "localDate": "2025-03-15" } }
        }))
        .unwrap()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut favorites = FavoritesState::new();
        assert!(favorites.toggle(event("E1")));
        assert!(favorites.is_favorite("E1"));

        assert!(!favorites.toggle(event("E1")));
        assert!(!favorites.is_favorite("E1"));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut favorites = FavoritesState::new();
        for id in ["A", "B", "C"] {
            favorites.toggle(event(id));
        }
        favorites.toggle(event("B"));
        favorites.toggle(event("B"));

        let ids: Vec<_> = favorites.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_toggle_matches_by_id() {
        let mut favorites = FavoritesState::new();
        favorites.toggle(event("E1"));

        let mut renamed = event("E1");
        renamed.name = "Renamed".into();
        assert!(!favorites.toggle(renamed));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_load_drops_duplicates() {
        let store = MemoryStore::new();
        let mut second = event("A");
        second.name = "Second copy".into();
        storage::save_json(&store, keys::FAVORITES, &vec![event("A"), event("B"), second]);

        let favorites = FavoritesState::load(&store);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites.get("A").map(|e| e.name.as_str()), Some("Event A"));
    }

    #[test]
    fn test_persist_and_forget() {
        let store = MemoryStore::new();
        let mut favorites = FavoritesState::new();
        favorites.toggle(event("E1"));
        assert!(favorites.persist(&store));
        assert_eq!(FavoritesState::load(&store), favorites);

        assert!(FavoritesState::forget(&store));
        assert!(store.get(keys::FAVORITES).unwrap().is_none());
    }

    #[test]
    fn test_load_garbage_is_empty() {
        let store = MemoryStore::with_entries([(keys::FAVORITES, "not json")]);
        assert!(FavoritesState::load(&store).is_empty());
    }
}
