//! Side effects declared by the reducer
//!
//! Persistence effects run synchronously inside `App::dispatch`; catalog
//! effects are spawned as tasks that report back with `Did*` actions.

use crate::catalog::SearchParams;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Load a search page (cache first)
    Search(SearchParams),
    /// Load a search page from the network, replacing the cached copy
    Refetch(SearchParams),
    /// Load a single event (cache first)
    LoadEvent(String),
    /// Expire old cache entries and refetch the active search if it was one
    Revalidate(Revalidation),
    /// Write the favorites list
    SaveFavorites,
    /// Delete the persisted favorites list
    ClearFavorites,
    /// Write the theme mode
    SaveThemeMode,
    /// Write the custom palette
    SaveCustomColors,
}

/// What prompted a revalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidation {
    Focus,
    Reconnect,
}
