//! Keyed response cache with a staleness window and LRU eviction

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

/// How long responses stay fresh and how many are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub stale_after: Duration,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(60),
            max_entries: 64,
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
    last_used: u64,
}

/// Response cache.
///
/// An entry is fresh until it is older than `stale_after` or explicitly
/// invalidated. Stale entries stay readable through [`QueryCache::peek`]
/// until they are replaced or evicted.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    policy: CachePolicy,
    entries: HashMap<K, CacheEntry<V>>,
    clock: u64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            clock: 0,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn is_stale(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        entry.invalidated || now.duration_since(entry.fetched_at) >= self.policy.stale_after
    }

    /// Fresh value for `key`, marking it recently used
    pub fn fresh(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();
        let stale = self.is_stale(self.entries.get(key)?, now);
        if stale {
            return None;
        }
        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Value for `key` regardless of staleness
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn is_fresh(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !self.is_stale(entry, Instant::now()))
    }

    /// Store a freshly fetched value, evicting the least recently used
    /// entries beyond `max_entries`.
    pub fn insert(&mut self, key: K, value: V) {
        let tick = self.tick();
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
                last_used: tick,
            },
        );
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.policy.max_entries.max(1) {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Mark one entry stale. Returns whether the key was cached.
    pub fn invalidate(&mut self, key: &K) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.invalidated = true;
        }
    }

    /// Mark every entry past the staleness window as invalidated and
    /// return their keys.
    pub fn invalidate_expired(&mut self) -> Vec<K> {
        let now = Instant::now();
        let stale_after = self.policy.stale_after;
        self.entries
            .iter_mut()
            .filter(|(_, entry)| now.duration_since(entry.fetched_at) >= stale_after)
            .map(|(key, entry)| {
                entry.invalidated = true;
                key.clone()
            })
            .collect()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
