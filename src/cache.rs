//! An in-memory query cache with per-entry staleness and prefix invalidation.
//!
//! Keys are lists of parts, e.g. `["transactions", 4]`. Invalidating `["transactions"]` drops
//! every key that starts with it.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// One part of a `QueryKey`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    Text(String),
    Id(u64),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::Id(value)
    }
}

/// Identifies a cached query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(root: impl Into<KeyPart>) -> Self {
        Self(vec![root.into()])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|p| match p {
                KeyPart::Text(s) => format!("{s:?}"),
                KeyPart::Id(n) => n.to_string(),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    stale_time: Duration,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) < self.stale_time
    }
}

/// Counters kept by the cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of `invalidate` calls.
    pub invalidations: u64,
}

#[derive(Default)]
pub struct QueryCache {
    entries: BTreeMap<QueryKey, Entry>,
    stats: CacheStats,
}

impl Debug for QueryCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("stats", &self.stats)
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` if it is present, of type `T` and not stale.
    /// Stale entries are dropped on the way.
    pub fn get<T>(&mut self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.drop_stale(Instant::now());
        let found = self
            .entries
            .get(key)
            .and_then(|e| e.value.downcast_ref::<T>())
            .cloned();
        match found {
            Some(_) => self.stats.hits += 1,
            None => self.stats.misses += 1,
        }
        found
    }

    /// Stores `value` under `key`. It stays fresh for `stale_time`.
    pub fn insert<T>(&mut self, key: QueryKey, value: T, stale_time: Duration)
    where
        T: Send + Sync + 'static,
    {
        let now = Instant::now();
        self.drop_stale(now);
        self.entries.insert(
            key,
            Entry {
                value: Arc::new(value),
                fetched_at: now,
                stale_time,
            },
        );
    }

    /// Drops every entry whose key starts with `prefix`. Returns how many were dropped.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        self.stats.invalidations += 1;
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        before - self.entries.len()
    }

    fn drop_stale(&mut self, now: Instant) {
        self.entries.retain(|_, e| e.is_fresh(now));
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
