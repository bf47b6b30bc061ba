//! Everything that can happen to the app state
//!
//! Naming drives category inference: the prefix before the verb or `Did`
//! marker is the category (`SearchSubmit`, `SearchDidLoad` -> `search`).
//! `Did*` variants carry results of async work back into the store.

use explorer_dispatch::ActionSummary;

use crate::catalog::{Event, EventsResponse, SearchParams};
use crate::theme::{ColorKey, ThemeMode};

#[derive(explorer_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    // ===== Search =====
    /// Run a new search (page 0 unless the params say otherwise)
    SearchSubmit(SearchParams),
    /// Load the page after the current one, if there is one
    SearchNextPage,
    /// Bypass the cache for the current search
    SearchRefetch,
    SearchDidLoad {
        params: SearchParams,
        response: EventsResponse,
    },
    SearchDidError {
        params: SearchParams,
        error: String,
    },

    // ===== Detail =====
    DetailOpen(String),
    DetailDidLoad(Event),
    DetailDidError {
        id: String,
        error: String,
    },
    DetailClose,

    // ===== Favorites =====
    FavoritesToggle(Event),
    FavoritesClear,

    // ===== Theme =====
    ThemeSetMode(ThemeMode),
    ThemeToggle,
    ThemeSetColor {
        key: ColorKey,
        value: String,
    },
    ThemeResetColors,

    // ===== Lifecycle =====
    /// The app came to the foreground
    #[action(category = "lifecycle")]
    AppDidFocus,
    /// Connectivity was restored
    #[action(category = "lifecycle")]
    NetworkDidReconnect,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Compact log lines for payload-heavy actions
impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::SearchSubmit(params) => format!("SearchSubmit({})", params.cache_key()),
            Action::SearchDidLoad { params, response } => format!(
                "SearchDidLoad {{ {}, events: {}, page: {}/{} }}",
                params.cache_key(),
                response.events.len(),
                response.page.number,
                response.page.total_pages
            ),
            Action::SearchDidError { params, error } => format!(
                "SearchDidError {{ {}, error: {:?} }}",
                params.cache_key(),
                truncate(error, 40)
            ),
            Action::DetailDidLoad(event) => format!("DetailDidLoad({})", event.id),
            Action::DetailDidError { id, error } => {
                format!("DetailDidError {{ {id}, error: {:?} }}", truncate(error, 40))
            }
            Action::FavoritesToggle(event) => format!("FavoritesToggle({})", event.id),
            _ => format!("{:?}", self),
        }
    }
}
