//! Keyed async work that reports back as actions
//!
//! Spawning under a key that is still running aborts the older task, so a
//! key has at most one request in flight. Different keys run side by side.
//!
//! ```ignore
//! tasks.spawn(TaskKey::new(format!("detail:{id}")), async move {
//!     match catalog.get_by_id(&id).await {
//!         Ok(event) => Action::DetailDidLoad(event),
//!         Err(e) => Action::DetailDidError { id, error: e.to_string() },
//!     }
//! });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinError, JoinSet};

use crate::Action;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owns the abort handles of spawned tasks.
///
/// A finished task sends its action on the channel passed to
/// [`new`](Self::new). An aborted or panicked one sends nothing, which is
/// what [`join_next`](Self::join_next) is for. Dropping the manager aborts
/// everything still registered.
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    set: JoinSet<()>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A: Action> TaskManager<A> {
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            set: JoinSet::new(),
            action_tx,
        }
    }

    /// Start `future`, replacing whatever ran under `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();
        self.prune_finished();
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle = self.set.spawn(async move {
            // Receiver gone means the app shut down
            let _ = tx.send(future.await);
        });

        tracing::trace!(task = %key, "spawned");
        self.tasks.insert(key, handle);
        self
    }

    /// Wait until some spawned task ends, however it ended.
    /// Returns `false` at once when there is nothing to wait for.
    pub async fn join_next(&mut self) -> bool {
        match self.set.join_next().await {
            Some(result) => {
                report(&self.tasks, result);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            if !handle.is_finished() {
                tracing::trace!(task = %key, "cancelled");
            }
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
        self.set.abort_all();
    }

    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    pub fn has_running(&self) -> bool {
        self.tasks.values().any(|h| !h.is_finished())
    }

    /// Forget tasks that already completed
    pub fn prune_finished(&mut self) {
        while let Some(result) = self.set.try_join_next() {
            report(&self.tasks, result);
        }
        self.tasks.retain(|_, h| !h.is_finished());
    }

    /// Registered tasks, finished or not
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn report(tasks: &HashMap<TaskKey, AbortHandle>, result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            let key = tasks
                .iter()
                .find(|(_, h)| h.id() == e.id())
                .map_or("unregistered", |(k, _)| k.name());
            tracing::error!(task = key, "task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    struct Loaded(u32);

    impl Action for Loaded {
        fn name(&self) -> &'static str {
            "Loaded"
        }
    }

    fn manager() -> (TaskManager<Loaded>, mpsc::UnboundedReceiver<Loaded>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TaskManager::new(tx), rx)
    }

    fn after(ms: u64, value: u32) -> impl Future<Output = Loaded> + Send + 'static {
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Loaded(value)
        }
    }

    #[tokio::test]
    async fn test_spawn_sends_action() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("detail:E1", async { Loaded(42) });
        assert_eq!(rx.recv().await, Some(Loaded(42)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_replaces_previous() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("search:nyc", after(100, 1));
        tasks.spawn("search:nyc", after(10, 2));
        assert_eq!(tasks.len(), 1);

        assert_eq!(rx.recv().await, Some(Loaded(2)));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_both_complete() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("search:a", after(20, 1));
        tasks.spawn("search:b", after(10, 2));

        assert_eq!(rx.recv().await, Some(Loaded(2)));
        assert_eq!(rx.recv().await, Some(Loaded(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_cancel_all() {
        let (mut tasks, mut rx) = manager();
        let key = TaskKey::new("detail:E1");
        tasks.spawn(key.clone(), after(100, 1));
        tasks.spawn("detail:E2", after(100, 2));
        assert!(tasks.is_running(&key));

        tasks.cancel(&key);
        assert!(!tasks.is_running(&key));
        assert!(tasks.has_running());

        tasks.cancel_all();
        assert!(tasks.is_empty());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_prune_finished() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("quick", async { Loaded(7) });
        rx.recv().await;

        // The send happens just before the task body returns
        while tasks.has_running() {
            tokio::task::yield_now().await;
        }
        assert_eq!(tasks.len(), 1);
        tasks.prune_finished();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_join_next_sees_panicked_task() {
        let (mut tasks, mut rx) = manager();
        tasks.spawn("detail:E1", async { panic!("decoder blew up") });

        assert!(tasks.join_next().await);
        assert!(!tasks.has_running());
        assert!(rx.try_recv().is_err());
        assert!(!tasks.join_next().await);
    }
}
