//! explorer-dispatch: centralized state management for the event-explorer client
//!
//! Like Redux/Elm: one state tree, mutated only through dispatched actions,
//! with side effects declared by the reducer.
//!
//! # Example
//! ```ignore
//! use explorer_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum Action {
//!     FavoritesToggle(Event),
//!     FavoritesClear,
//!     ThemeToggle,
//! }
//! ```

// Re-export everything from core
pub use explorer_dispatch_core::*;

// Re-export derive macros
pub use explorer_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use explorer_dispatch_core::prelude::*;

    // Derive macros
    pub use explorer_dispatch_macros::Action;
}
