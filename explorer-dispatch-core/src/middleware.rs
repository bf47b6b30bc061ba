//! Hooks around dispatch

use std::fmt;

use crate::Action;

/// Sees every action on its way into the reducer and the change flag on
/// the way out.
pub trait Middleware<A: Action> {
    fn before(&mut self, action: &A);

    fn after(&mut self, action: &A, state_changed: bool);
}

/// Ordered stack of middleware. `before` runs front to back and `after`
/// back to front, so the first one added wraps the rest.
pub struct ComposedMiddleware<A: Action> {
    stack: Vec<Box<dyn Middleware<A> + Send>>,
}

impl<A: Action> fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("len", &self.stack.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn add<M: Middleware<A> + Send + 'static>(&mut self, middleware: M) {
        self.stack.push(Box::new(middleware));
    }

    pub fn with<M: Middleware<A> + Send + 'static>(mut self, middleware: M) -> Self {
        self.add(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.stack {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        for middleware in self.stack.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}
