use crate::{CacheEntry, Context, Result, Store};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Unbounded in-memory store backed by a plain map.
///
/// Entries are kept until they expire or are deleted. Expired entries are
/// invisible to reads immediately and are physically dropped on the next write
/// touching the same key or by [`purge_expired`](Self::purge_expired).
///
/// # Thread Safety
///
/// The map sits behind a `parking_lot::RwLock`: reads proceed concurrently, writes
/// are exclusive. No lock is held across an `.await`.
///
/// # Examples
///
/// ```
/// use cacheaside_core::{Context, MemoryStore, Store};
/// use std::collections::HashMap;
/// use std::time::Duration;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let store = MemoryStore::new();
/// let ctx = Context::background();
///
/// let items = HashMap::from([("user:1".to_string(), "ada".to_string())]);
/// store.mset(&ctx, items, Duration::ZERO).await.unwrap();
///
/// assert_eq!(store.get(&ctx, "user:1").await.unwrap(), Some("ada".to_string()));
/// assert_eq!(store.get(&ctx, "user:2").await.unwrap(), None);
/// # });
/// ```
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remaining lifetime of `key`: `Some(None)` for entries without expiration,
    /// `None` when the key is absent or expired.
    pub fn ttl_of(&self, key: &str) -> Option<Option<Duration>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::time_to_live)
    }

    fn live<'a>(
        entries: &'a HashMap<String, CacheEntry<V>>,
        key: &str,
        now: Instant,
    ) -> Option<&'a CacheEntry<V>> {
        entries.get(key).filter(|entry| !entry.is_expired_at(now))
    }
}

#[async_trait]
impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let entries = self.entries.read();
        Ok(Self::live(&entries, key, Instant::now()).map(|entry| entry.value.clone()))
    }

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .filter_map(|key| {
                Self::live(&entries, key, now).map(|entry| (key.clone(), entry.value.clone()))
            })
            .collect())
    }

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .map(|key| (key.clone(), Self::live(&entries, key, now).is_some()))
            .collect())
    }

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let mut entries = self.entries.write();
        for (key, value) in items {
            entries.insert(key, CacheEntry::new(value, ttl));
        }
        Ok(())
    }

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let now = Instant::now();
        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in keys {
            if let Some(entry) = entries.remove(key) {
                if !entry.is_expired_at(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}
