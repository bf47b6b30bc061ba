//! Reducer: (state, action) -> effects
//!
//! All state transitions happen here. Persistence and network work are
//! returned as [`Effect`]s for the app to carry out.

use explorer_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::{Effect, Revalidation};
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Search =====
        Action::SearchSubmit(params) => {
            let params = params.normalized();
            let search = &mut state.search;
            search.params = Some(params.clone());
            search.is_fetching = true;
            search.is_loading = search.response.is_none();
            search.error = None;
            DispatchResult::changed_with(Effect::Search(params))
        }

        Action::SearchNextPage => {
            let search = &mut state.search;
            let next = match &search.params {
                Some(params) if search.has_more() && !search.is_fetching => params.next_page(),
                _ => return DispatchResult::unchanged(),
            };
            search.params = Some(next.clone());
            search.is_fetching = true;
            search.error = None;
            DispatchResult::changed_with(Effect::Search(next))
        }

        Action::SearchRefetch => {
            let search = &mut state.search;
            let Some(params) = search.params.clone() else {
                return DispatchResult::unchanged();
            };
            search.is_fetching = true;
            search.is_loading = search.response.is_none();
            search.error = None;
            DispatchResult::changed_with(Effect::Refetch(params))
        }

        Action::SearchDidLoad { params, response } => {
            let search = &mut state.search;
            if !search.is_current(&params) {
                // Superseded; the catalog cache already has it
                return DispatchResult::unchanged();
            }
            search.response = Some(response);
            search.is_loading = false;
            search.is_fetching = false;
            search.error = None;
            DispatchResult::changed()
        }

        Action::SearchDidError { params, error } => {
            let search = &mut state.search;
            if !search.is_current(&params) {
                return DispatchResult::unchanged();
            }
            search.is_loading = false;
            search.is_fetching = false;
            search.error = Some(error);
            DispatchResult::changed()
        }

        // ===== Detail =====
        Action::DetailOpen(id) => {
            let detail = &mut state.detail;
            detail.selected_id = Some(id.clone());
            detail.event = None;
            detail.is_loading = true;
            detail.error = None;
            DispatchResult::changed_with(Effect::LoadEvent(id))
        }

        Action::DetailDidLoad(event) => {
            let detail = &mut state.detail;
            if !detail.is_selected(&event.id) {
                return DispatchResult::unchanged();
            }
            detail.event = Some(event);
            detail.is_loading = false;
            detail.error = None;
            DispatchResult::changed()
        }

        Action::DetailDidError { id, error } => {
            let detail = &mut state.detail;
            if !detail.is_selected(&id) {
                return DispatchResult::unchanged();
            }
            detail.is_loading = false;
            detail.error = Some(error);
            DispatchResult::changed()
        }

        Action::DetailClose => {
            if !state.detail.is_open() {
                return DispatchResult::unchanged();
            }
            state.detail = Default::default();
            DispatchResult::changed()
        }

        // ===== Favorites =====
        Action::FavoritesToggle(event) => {
            state.favorites.toggle(event);
            DispatchResult::changed_with(Effect::SaveFavorites)
        }

        Action::FavoritesClear => {
            let was_empty = state.favorites.is_empty();
            state.favorites.clear();
            let result = DispatchResult::effect(Effect::ClearFavorites);
            if was_empty {
                result
            } else {
                result.mark_changed()
            }
        }

        // ===== Theme =====
        Action::ThemeSetMode(mode) => {
            let result = DispatchResult::effect(Effect::SaveThemeMode);
            if state.theme.set_mode(mode) {
                result.mark_changed()
            } else {
                result
            }
        }

        Action::ThemeToggle => {
            state.theme.toggle_mode();
            DispatchResult::changed_with(Effect::SaveThemeMode)
        }

        Action::ThemeSetColor { key, value } => {
            state.theme.set_custom_color(key, value);
            DispatchResult::changed_with(Effect::SaveCustomColors)
        }

        Action::ThemeResetColors => {
            state.theme.reset_custom_colors();
            DispatchResult::changed_with(Effect::SaveCustomColors)
        }

        // ===== Lifecycle =====
        Action::AppDidFocus => DispatchResult::effect(Effect::Revalidate(Revalidation::Focus)),

        Action::NetworkDidReconnect => {
            DispatchResult::effect(Effect::Revalidate(Revalidation::Reconnect))
        }
    }
}
