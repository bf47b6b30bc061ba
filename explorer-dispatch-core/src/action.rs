//! Action traits for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: Async completions travel back over a channel
///
/// Use `#[derive(Action)]` from `explorer-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Actions grouped into categories by naming convention
///
/// Generated by `#[derive(Action)]` with `#[action(infer_categories)]`.
/// `SearchSubmit` and `SearchDidLoad` share the `"search"` category.
pub trait ActionCategory: Action {
    /// Category enum generated for the action type
    type Category: Copy + Eq + Debug;

    /// Category name, `None` for uncategorized actions
    fn category(&self) -> Option<&'static str>;

    /// Category as enum value
    fn category_enum(&self) -> Self::Category;
}

/// Short human-readable form of an action for logs
///
/// The default falls back to `Debug`. Override it for actions that carry
/// large payloads (search responses, full events).
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
