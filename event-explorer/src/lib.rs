//! Event discovery client
//!
//! Search a remote event catalog, keep a list of favorite events and a
//! color theme, all behind one dispatch store:
//!
//! - [`catalog`]: wire model, HTTP client and response cache
//! - [`storage`]: synchronous key-value persistence
//! - [`favorites`], [`theme`]: persisted state slices
//! - [`App`]: the container that ties reducer, effects and subscribers
//!   together
//!
//! ```ignore
//! let storage = Arc::new(FileStore::open(&config.data_dir, &config.store_id)?);
//! let catalog = Arc::new(CatalogClient::http(config.catalog()?));
//! let mut app = App::init(storage, catalog);
//!
//! app.dispatch(Action::SearchSubmit(SearchParams::new().city("Chicago")));
//! app.settle().await;
//! for event in app.state().search.events() {
//!     println!("{} @ {}", event.name, event.venue_name());
//! }
//! ```

pub mod action;
pub mod app;
pub mod catalog;
pub mod config;
pub mod effect;
pub mod favorites;
pub mod logging;
pub mod reducer;
pub mod state;
pub mod storage;
pub mod theme;

pub use action::Action;
pub use app::App;
pub use config::{Config, ConfigError, GlobalArgs};
pub use effect::Effect;
pub use state::AppState;
