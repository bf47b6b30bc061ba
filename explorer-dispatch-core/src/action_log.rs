//! Dispatch logging
//!
//! [`ActionLoggerMiddleware`] emits a `tracing` event per dispatch and can
//! also keep the most recent entries in an [`ActionLog`] ring buffer. The
//! buffer sits behind an [`ActionLogHandle`] so the owner of the store can
//! read it while the middleware itself lives inside a
//! [`ComposedMiddleware`](crate::ComposedMiddleware).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::action::ActionSummary;
use crate::middleware::Middleware;

/// Include/exclude patterns over action names.
///
/// `*` matches any run of characters and `?` exactly one, so `Search*`
/// covers every search action and `*Did*` every async completion. An empty
/// include list means everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ActionFilter {
    /// From comma-separated pattern lists
    ///
    /// ```
    /// use explorer_dispatch_core::ActionFilter;
    ///
    /// let filter = ActionFilter::parse("Search*,Favorites*", "SearchNextPage");
    /// assert!(filter.matches("SearchSubmit"));
    /// assert!(filter.matches("FavoritesToggle"));
    /// assert!(!filter.matches("SearchNextPage"));
    /// assert!(!filter.matches("ThemeToggle"));
    /// ```
    pub fn parse(include: &str, exclude: &str) -> Self {
        Self {
            include: split_patterns(include),
            exclude: split_patterns(exclude),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| glob_match(p, name));
        included && !self.exclude.iter().any(|p| glob_match(p, name))
    }
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Last `*` seen and the text position it currently absorbs up to
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    backtrack = Some((star, absorbed + 1));
                    p = star + 1;
                    t = absorbed + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    pub name: &'static str,
    /// From [`ActionSummary::summary`]
    pub summary: String,
    pub at: Instant,
    /// Keeps counting across evictions
    pub sequence: u64,
    /// Filled in once the reducer has run
    pub state_changed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ActionLogConfig {
    pub capacity: usize,
    pub filter: ActionFilter,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionFilter::default(),
        }
    }
}

/// Bounded ring buffer of recent dispatches
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Record `action` unless the filter rejects it
    pub fn record<A: ActionSummary>(&mut self, action: &A) -> bool {
        let name = action.name();
        if self.config.capacity == 0 || !self.config.filter.matches(name) {
            return false;
        }
        if self.entries.len() == self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            name,
            summary: action.summary(),
            at: Instant::now(),
            sequence: self.next_sequence,
            state_changed: None,
        });
        self.next_sequence += 1;
        true
    }

    fn set_last_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub type ActionLogHandle = Arc<Mutex<ActionLog>>;

#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    filter: ActionFilter,
    log: Option<ActionLogHandle>,
    recorded_last: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only
    pub fn new(filter: ActionFilter) -> Self {
        Self {
            filter,
            log: None,
            recorded_last: false,
        }
    }

    /// Tracing plus a ring buffer, readable through [`handle`](Self::handle)
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            log: Some(Arc::new(Mutex::new(ActionLog::new(config)))),
            recorded_last: false,
        }
    }

    pub fn handle(&self) -> Option<ActionLogHandle> {
        self.log.clone()
    }

    pub fn filter(&self) -> &ActionFilter {
        &self.filter
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        let name = action.name();
        if self.filter.matches(name) {
            tracing::debug!(action = name, summary = %action.summary(), "dispatch");
        }
        self.recorded_last = match &self.log {
            Some(log) => log
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .record(action),
            None => false,
        };
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.filter.matches(action.name()) {
            tracing::trace!(action = action.name(), state_changed, "dispatched");
        }
        // A filtered action must not overwrite the previous entry
        if let (true, Some(log)) = (self.recorded_last, &self.log) {
            log.lock()
                .unwrap_or_else(|e| e.into_inner())
                .set_last_changed(state_changed);
        }
    }
}
