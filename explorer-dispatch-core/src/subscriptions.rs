//! Long-lived action sources
//!
//! A task is one request and one result. A subscription keeps emitting
//! until cancelled: a periodic revalidation tick, or a stream of lifecycle
//! signals (focus, connectivity) mapped to actions.
//!
//! ```ignore
//! let mut subs = Subscriptions::new(app.sender());
//! subs.interval("revalidate", Duration::from_secs(30), || Action::AppDidFocus);
//! subs.stream("network", reconnects.map(|_| Action::NetworkDidReconnect));
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};

use crate::Action;

/// Running subscriptions by name. Each one also stops by itself once the
/// action channel closes.
pub struct Subscriptions<A> {
    handles: HashMap<String, JoinHandle<()>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A: Action> Subscriptions<A> {
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            handles: HashMap::new(),
            action_tx,
        }
    }

    /// Emit `action_fn()` every `period`, first one period from now.
    /// Replaces a subscription of the same name.
    pub fn interval<F>(&mut self, name: &str, period: Duration, action_fn: F) -> &mut Self
    where
        F: Fn() -> A + Send + 'static,
    {
        let tx = self.action_tx.clone();
        let start = tokio::time::Instant::now() + period;
        self.insert(
            name,
            tokio::spawn(async move {
                let mut ticks = tokio::time::interval_at(start, period);
                loop {
                    ticks.tick().await;
                    if tx.send(action_fn()).is_err() {
                        break;
                    }
                }
            }),
        );
        self
    }

    /// Forward every item of `stream`. Replaces a subscription of the same name.
    pub fn stream<S>(&mut self, name: &str, stream: S) -> &mut Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        self.insert(
            name,
            tokio::spawn(async move {
                tokio::pin!(stream);
                while let Some(action) = stream.next().await {
                    if tx.send(action).is_err() {
                        break;
                    }
                }
            }),
        );
        self
    }

    fn insert(&mut self, name: &str, handle: JoinHandle<()>) {
        if let Some(old) = self.handles.insert(name.to_string(), handle) {
            old.abort();
        }
        tracing::trace!(subscription = name, "started");
    }

    pub fn cancel(&mut self, name: &str) -> bool {
        self.handles.remove(name).map(|h| h.abort()).is_some()
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.handles.get(name).is_some_and(|h| !h.is_finished())
    }
}

impl<A> Drop for Subscriptions<A> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}
