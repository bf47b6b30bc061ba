//! Core traits and types for explorer-dispatch
//!
//! A Redux/Elm-style state layer: one state tree, mutated only by a reducer
//! in response to dispatched actions, with side effects declared by the
//! reducer and executed by the owner of the store.
//!
//! # Core Concepts
//!
//! - **Action**: an event describing a state change
//! - **EffectStoreWithMiddleware**: state container whose reducer returns [`DispatchResult`]
//! - **Middleware**: hooks around each dispatch (logging, auditing)
//! - **Listeners**: subscribers notified after state changes
//! - **TaskManager** / **Subscriptions**: async work that reports back as actions
//!
//! # Async Handler Pattern
//!
//! Work that cannot finish inside the reducer uses two actions:
//!
//! 1. **Intent actions** trigger async work (`SearchSubmit`)
//! 2. **Result actions** carry the outcome back (`SearchDidLoad`, `SearchDidError`)
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(action) = action_rx.recv() => {
//!             let result = store.dispatch(action);
//!             for effect in result.effects {
//!                 handle_effect(effect, &mut tasks);
//!             }
//!         }
//!         _ = shutdown.cancelled() => break,
//!     }
//! }
//! ```
//!
//! The `Did*` naming convention marks result actions. With
//! `#[action(infer_categories)]`, `SearchSubmit` and `SearchDidLoad` both land in
//! the `"search"` category.

pub mod action;
pub mod action_log;
pub mod effect;
pub mod listeners;
pub mod middleware;
#[cfg(feature = "subscriptions")]
pub mod subscriptions;
#[cfg(feature = "tasks")]
pub mod tasks;
pub mod testing;

pub use action::{Action, ActionCategory, ActionSummary};
pub use action_log::{
    ActionFilter, ActionLog, ActionLogConfig, ActionLogEntry, ActionLogHandle,
    ActionLoggerMiddleware,
};
pub use effect::{DispatchResult, EffectReducer, EffectStoreWithMiddleware};
pub use listeners::{ListenerId, Listeners};
pub use middleware::{ComposedMiddleware, Middleware};

#[cfg(feature = "subscriptions")]
pub use subscriptions::Subscriptions;
#[cfg(feature = "tasks")]
pub use tasks::{TaskKey, TaskManager};

pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::effect::{DispatchResult, EffectStoreWithMiddleware};
    pub use crate::listeners::{ListenerId, Listeners};
    pub use crate::middleware::{ComposedMiddleware, Middleware};
    #[cfg(feature = "subscriptions")]
    pub use crate::subscriptions::Subscriptions;
    #[cfg(feature = "tasks")]
    pub use crate::tasks::{TaskKey, TaskManager};
}
