//! State change listeners
//!
//! Listeners are the subscriber side of a store: after a dispatch that
//! changed state, every registered listener is called with the new state.
//! They are called in registration order and must not dispatch re-entrantly;
//! queue follow-up actions on the action channel instead.

use std::collections::BTreeMap;
use std::fmt;

/// Handle returned by [`Listeners::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

type Listener<S> = Box<dyn FnMut(&S) + Send>;

/// Registry of state listeners keyed by [`ListenerId`]
pub struct Listeners<S> {
    listeners: BTreeMap<ListenerId, Listener<S>>,
    next_id: u64,
}

impl<S> fmt::Debug for Listeners<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl<S> Default for Listeners<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Listeners<S> {
    pub fn new() -> Self {
        Self {
            listeners: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Register a listener, returning its id for later removal
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&S) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Call every listener with the given state
    pub fn notify(&mut self, state: &S) {
        for listener in self.listeners.values_mut() {
            listener(state);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
