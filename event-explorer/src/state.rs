//! Application state, the single source of truth
//!
//! Only the reducer mutates it. Favorites and theme are loaded from storage
//! when the app starts; the view slices start empty.

use crate::catalog::{Event, EventsResponse, SearchParams};
use crate::favorites::FavoritesState;
use crate::theme::ThemeState;

/// The search screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchView {
    /// Query the view is showing (None before the first search)
    pub params: Option<SearchParams>,
    /// Last page received for `params`, kept while a newer one loads
    pub response: Option<EventsResponse>,
    /// A request is in flight and there is nothing to show yet
    pub is_loading: bool,
    /// A request is in flight
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl SearchView {
    pub fn events(&self) -> &[Event] {
        self.response
            .as_ref()
            .map(|response| response.events.as_slice())
            .unwrap_or_default()
    }

    /// Whether the loaded page has a successor
    pub fn has_more(&self) -> bool {
        self.response.as_ref().is_some_and(EventsResponse::has_more)
    }

    pub fn is_current(&self, params: &SearchParams) -> bool {
        self.params.as_ref() == Some(params)
    }
}

/// The event detail screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailView {
    pub selected_id: Option<String>,
    pub event: Option<Event>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl DetailView {
    pub fn is_open(&self) -> bool {
        self.selected_id.is_some()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_id.as_deref() == Some(id)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub search: SearchView,
    pub detail: DetailView,
    pub favorites: FavoritesState,
    pub theme: ThemeState,
}

impl AppState {
    pub fn new(favorites: FavoritesState, theme: ThemeState) -> Self {
        Self {
            favorites,
            theme,
            ..Self::default()
        }
    }
}
