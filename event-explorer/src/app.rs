//! The application state container
//!
//! Owns the store, the task manager and the subscriber list. Constructed
//! explicitly with its storage and catalog; nothing here is global.

use std::sync::Arc;

use explorer_dispatch::{
    ActionLogConfig, ActionLogEntry, ActionLogHandle, ActionLoggerMiddleware, ComposedMiddleware,
    EffectStoreWithMiddleware, ListenerId, Listeners, Middleware, TaskKey, TaskManager,
};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::catalog::{CatalogClient, SearchParams};
use crate::effect::{Effect, Revalidation};
use crate::favorites::FavoritesState;
use crate::reducer::reducer;
use crate::state::AppState;
use crate::storage::KeyValueStore;
use crate::theme::ThemeState;

type Store = EffectStoreWithMiddleware<AppState, Action, Effect, ComposedMiddleware<Action>>;

fn search_task(params: &SearchParams) -> TaskKey {
    TaskKey::new(format!("search:{}", params.cache_key()))
}

fn detail_task(id: &str) -> TaskKey {
    TaskKey::new(format!("detail:{id}"))
}

pub struct App {
    store: Store,
    storage: Arc<dyn KeyValueStore>,
    catalog: Arc<CatalogClient>,
    tasks: TaskManager<Action>,
    listeners: Listeners<AppState>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    action_log: Option<ActionLogHandle>,
}

impl App {
    /// Load persisted slices and build the container.
    ///
    /// Dispatches are logged with `tracing` and the last 100 are kept in
    /// memory (see [`App::recent_actions`]).
    pub fn init(storage: Arc<dyn KeyValueStore>, catalog: Arc<CatalogClient>) -> Self {
        let logger = ActionLoggerMiddleware::with_log(ActionLogConfig::default());
        Self::with_logger(storage, catalog, logger)
    }

    pub fn with_logger(
        storage: Arc<dyn KeyValueStore>,
        catalog: Arc<CatalogClient>,
        logger: ActionLoggerMiddleware,
    ) -> Self {
        let favorites = FavoritesState::load(storage.as_ref());
        let theme = ThemeState::load(storage.as_ref());
        let state = AppState::new(favorites, theme);

        let action_log = logger.handle();
        let middleware = ComposedMiddleware::new().with(logger);
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        tracing::info!(
            favorites = state.favorites.len(),
            theme = %state.theme.mode(),
            "app initialized"
        );

        Self {
            store: EffectStoreWithMiddleware::new(state, reducer, middleware),
            storage,
            catalog,
            tasks: TaskManager::new(action_tx.clone()),
            listeners: Listeners::new(),
            action_tx,
            action_rx,
            action_log,
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn catalog(&self) -> &Arc<CatalogClient> {
        &self.catalog
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    /// Channel for actions produced outside the container (timers, input).
    /// They are applied by [`App::process_next`] or [`App::settle`].
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Append a middleware after the action logger
    pub fn add_middleware<M>(&mut self, middleware: M)
    where
        M: Middleware<Action> + Send + 'static,
    {
        self.store.middleware_mut().add(middleware);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&AppState) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Apply an action: reducer, then effects, then subscribers (only if
    /// the state changed). Returns whether the state changed.
    ///
    /// Catalog effects spawn tasks, so this must run inside a tokio runtime.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.handle_effect(effect);
        }
        if result.changed {
            self.listeners.notify(self.store.state());
        }
        result.changed
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Search(params) => {
                let catalog = Arc::clone(&self.catalog);
                self.tasks.spawn(search_task(&params), async move {
                    match catalog.search(&params).await {
                        Ok(response) => Action::SearchDidLoad { params, response },
                        Err(e) => Action::SearchDidError {
                            params,
                            error: e.to_string(),
                        },
                    }
                });
            }
            Effect::Refetch(params) => {
                let catalog = Arc::clone(&self.catalog);
                self.tasks.spawn(search_task(&params), async move {
                    match catalog.refetch(&params).await {
                        Ok(response) => Action::SearchDidLoad { params, response },
                        Err(e) => Action::SearchDidError {
                            params,
                            error: e.to_string(),
                        },
                    }
                });
            }
            Effect::LoadEvent(id) => {
                let catalog = Arc::clone(&self.catalog);
                self.tasks.spawn(detail_task(&id), async move {
                    match catalog.get_by_id(&id).await {
                        Ok(event) => Action::DetailDidLoad(event),
                        Err(e) => Action::DetailDidError {
                            id,
                            error: e.to_string(),
                        },
                    }
                });
            }
            Effect::Revalidate(reason) => self.revalidate(reason),
            Effect::SaveFavorites => {
                self.store.state().favorites.persist(self.storage.as_ref());
            }
            Effect::ClearFavorites => {
                FavoritesState::forget(self.storage.as_ref());
            }
            Effect::SaveThemeMode => {
                self.store.state().theme.persist_mode(self.storage.as_ref());
            }
            Effect::SaveCustomColors => {
                self.store
                    .state()
                    .theme
                    .persist_custom_colors(self.storage.as_ref());
            }
        }
    }

    fn revalidate(&mut self, reason: Revalidation) {
        let expired = match reason {
            Revalidation::Focus => self.catalog.on_focus(),
            Revalidation::Reconnect => self.catalog.on_reconnect(),
        };

        let search = &self.store.state().search;
        let Some(current) = &search.params else {
            return;
        };
        // A failed search is retried once the network is back
        let retry_failed = reason == Revalidation::Reconnect && search.error.is_some();
        if expired.contains(current) || retry_failed {
            tracing::debug!(key = %current.cache_key(), ?reason, "refetching active search");
            let _ = self.action_tx.send(Action::SearchRefetch);
        }
    }

    /// Apply one queued action without waiting. Returns false if none was queued.
    pub fn try_process_next(&mut self) -> bool {
        match self.action_rx.try_recv() {
            Ok(action) => {
                self.dispatch(action);
                true
            }
            Err(_) => false,
        }
    }

    /// Wait for the next queued action (task result, timer tick) and apply it.
    /// Returns whether the state changed.
    pub async fn process_next(&mut self) -> bool {
        match self.action_rx.recv().await {
            Some(action) => self.dispatch(action),
            None => false,
        }
    }

    /// Apply queued actions until the queue is empty and no task is running.
    pub async fn settle(&mut self) {
        loop {
            while self.try_process_next() {}

            if !self.tasks.has_running() {
                // A task may have finished between the drain and the check
                if self.try_process_next() {
                    continue;
                }
                break;
            }

            tokio::select! {
                action = self.action_rx.recv() => match action {
                    Some(action) => {
                        self.dispatch(action);
                    }
                    None => break,
                },
                // A panicked task ends without sending anything
                _ = self.tasks.join_next() => {}
            }
        }
        self.tasks.prune_finished();
    }

    /// Whether any catalog request is in flight
    pub fn is_busy(&self) -> bool {
        self.tasks.has_running()
    }

    /// Newest first
    pub fn recent_actions(&self, count: usize) -> Vec<ActionLogEntry> {
        match &self.action_log {
            Some(log) => log
                .lock()
                .map(|log| log.recent(count).cloned().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Cancel in-flight requests and drop subscribers. Queued actions are
    /// discarded.
    pub fn shutdown(&mut self) {
        self.tasks.cancel_all();
        self.listeners.clear();
        while self.action_rx.try_recv().is_ok() {}
        tracing::info!("app shut down");
    }
}
