use crate::utils::{find_arc_eviction_key, find_min_frequency_key, move_key_to_end, remove_from_order};
use crate::{CacheEntry, CacheError, Context, EvictionPolicy, Result, Store};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::trace;

/// Configuration for a [`BoundedStore`].
///
/// # Examples
///
/// ```
/// use cacheaside_core::{BoundedStoreConfig, EvictionPolicy};
///
/// let config = BoundedStoreConfig::builder()
///     .limit(1_000)
///     .policy("arc")
///     .build()
///     .unwrap();
/// assert_eq!(config.limit, Some(1_000));
/// assert_eq!(config.policy, EvictionPolicy::ARC);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundedStoreConfig {
    /// Maximum number of entries (None = unlimited)
    pub limit: Option<usize>,

    /// Eviction policy applied when `limit` is reached
    pub policy: EvictionPolicy,
}

impl BoundedStoreConfig {
    pub fn builder() -> BoundedStoreConfigBuilder {
        BoundedStoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(CacheError::InvalidArgument(
                "limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`BoundedStoreConfig`].
#[derive(Debug, Default)]
pub struct BoundedStoreConfigBuilder {
    limit: Option<usize>,
    policy: Option<EvictionPolicy>,
}

impl BoundedStoreConfigBuilder {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn policy(mut self, policy: impl Into<EvictionPolicy>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    pub fn build(self) -> Result<BoundedStoreConfig> {
        let config = BoundedStoreConfig {
            limit: self.limit,
            policy: self.policy.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// A bounded, process-local store with configurable eviction and per-entry TTL.
///
/// Entries live in a `DashMap` for concurrent access; an order queue behind a
/// `parking_lot::Mutex` tracks insertion or access order for eviction. The map
/// shard lock is never held while the order lock is acquired.
///
/// # Eviction Behavior
///
/// When `limit` is reached, expired entries are reclaimed first; if none are
/// expired a victim is chosen by the configured policy:
///
/// - **FIFO**: Oldest written entry (front of the order queue)
/// - **LRU**: Least recently read or written entry (front of the order queue)
/// - **LFU**: Entry with the lowest read counter
/// - **ARC**: Entry with the lowest `frequency × position_weight` score
/// - **Random**: Uniformly random entry
///
/// Overwriting an existing key never evicts.
///
/// # Examples
///
/// ```
/// use cacheaside_core::{BoundedStore, BoundedStoreConfig, Context, EvictionPolicy, Store};
/// use std::collections::HashMap;
/// use std::time::Duration;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let config = BoundedStoreConfig::builder().limit(2).policy(EvictionPolicy::FIFO).build().unwrap();
/// let store = BoundedStore::new(config);
/// let ctx = Context::background();
///
/// for key in ["a", "b", "c"] {
///     let items = HashMap::from([(key.to_string(), key.len())]);
///     store.mset(&ctx, items, Duration::ZERO).await.unwrap();
/// }
///
/// // "a" was the oldest entry
/// assert_eq!(store.get(&ctx, "a").await.unwrap(), None);
/// assert_eq!(store.len(), 2);
/// # });
/// ```
pub struct BoundedStore<V> {
    /// key -> entry
    map: DashMap<String, CacheEntry<V>>,

    /// Keys from oldest (front) to most recent (back)
    order: Mutex<VecDeque<String>>,

    config: BoundedStoreConfig,
}

impl<V> BoundedStore<V> {
    pub fn new(config: BoundedStoreConfig) -> Self {
        Self {
            map: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// An LRU store holding at most `limit` entries.
    pub fn lru(limit: usize) -> Self {
        Self::new(BoundedStoreConfig {
            limit: Some(limit),
            policy: EvictionPolicy::LRU,
        })
    }

    pub fn config(&self) -> &BoundedStoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut order = self.order.lock();
        self.reclaim_expired(&mut order, Instant::now())
    }

    fn reclaim_expired(&self, order: &mut VecDeque<String>, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before.saturating_sub(self.map.len());
        if removed > 0 {
            order.retain(|k| self.map.contains_key(k));
        }
        removed
    }

    /// Reads one key, updating access bookkeeping on a hit and dropping the entry
    /// when it has expired.
    fn read(&self, key: &str, now: Instant) -> Option<V>
    where
        V: Clone,
    {
        let policy = self.config.policy;

        // Only frequency-counting policies need the shard write lock
        let value = if policy.counts_reads() {
            let mut entry_ref = self.map.get_mut(key)?;
            if entry_ref.is_expired_at(now) {
                drop(entry_ref);
                self.remove_expired(key, now);
                return None;
            }
            entry_ref.increment_frequency();
            entry_ref.value.clone()
        } else {
            let entry_ref = self.map.get(key)?;
            if entry_ref.is_expired_at(now) {
                drop(entry_ref);
                self.remove_expired(key, now);
                return None;
            }
            entry_ref.value.clone()
        };

        if self.config.limit.is_some() && policy.reorders_on_read() {
            let mut order = self.order.lock();
            if self.map.contains_key(key) {
                move_key_to_end(&mut order, key);
            }
        }

        Some(value)
    }

    fn remove_expired(&self, key: &str, now: Instant) {
        // Re-check under the order lock: a concurrent writer may have replaced it.
        let mut order = self.order.lock();
        if self.map.remove_if(key, |_, entry| entry.is_expired_at(now)).is_some() {
            remove_from_order(&mut order, key);
        }
    }

    fn write(&self, order: &mut VecDeque<String>, key: String, value: V, ttl: Duration) {
        if let Some(mut existing) = self.map.get_mut(&key) {
            *existing = CacheEntry::new(value, ttl);
            drop(existing);
            if self.config.policy != EvictionPolicy::FIFO {
                move_key_to_end(order, &key);
            }
            return;
        }

        self.handle_entry_limit_eviction(order);
        order.push_back(key.clone());
        self.map.insert(key, CacheEntry::new(value, ttl));
    }

    fn handle_entry_limit_eviction(&self, order: &mut VecDeque<String>) {
        let Some(limit) = self.config.limit else {
            return;
        };

        if self.map.len() >= limit {
            self.reclaim_expired(order, Instant::now());
        }

        while self.map.len() >= limit {
            let evict_key = match self.config.policy {
                EvictionPolicy::LFU => find_min_frequency_key(&self.map, order),
                EvictionPolicy::ARC => find_arc_eviction_key(&self.map, order),
                EvictionPolicy::Random => {
                    if order.is_empty() {
                        None
                    } else {
                        order.get(fastrand::usize(..order.len())).cloned()
                    }
                }
                EvictionPolicy::FIFO | EvictionPolicy::LRU => order.front().cloned(),
            };

            let Some(evict_key) = evict_key else {
                break;
            };
            trace!(key = %evict_key, policy = ?self.config.policy, "evicting entry");
            self.map.remove(&evict_key);
            remove_from_order(order, &evict_key);
        }
    }
}

#[async_trait]
impl<V> Store<V> for BoundedStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        Ok(self.read(key, Instant::now()))
    }

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let now = Instant::now();
        Ok(keys
            .iter()
            .filter_map(|key| self.read(key, now).map(|value| (key.clone(), value)))
            .collect())
    }

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let now = Instant::now();
        Ok(keys
            .iter()
            .map(|key| {
                let live = self
                    .map
                    .get(key)
                    .is_some_and(|entry| !entry.is_expired_at(now));
                (key.clone(), live)
            })
            .collect())
    }

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let mut order = self.order.lock();
        for (key, value) in items {
            self.write(&mut order, key, value, ttl);
        }
        Ok(())
    }

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        let now = Instant::now();
        let mut order = self.order.lock();
        let mut removed = 0;
        for key in keys {
            if let Some((_, entry)) = self.map.remove(key) {
                remove_from_order(&mut order, key);
                if !entry.is_expired_at(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(limit: usize, policy: EvictionPolicy) -> BoundedStore<&'static str> {
        BoundedStore::new(BoundedStoreConfig {
            limit: Some(limit),
            policy,
        })
    }

    async fn put(store: &BoundedStore<&'static str>, key: &str, value: &'static str) {
        let items = HashMap::from([(key.to_string(), value)]);
        store
            .mset(&Context::background(), items, Duration::ZERO)
            .await
            .unwrap();
    }

    async fn get(store: &BoundedStore<&'static str>, key: &str) -> Option<&'static str> {
        store.get(&Context::background(), key).await.unwrap()
    }

    #[tokio::test]
    async fn test_fifo_eviction() {
        let store = store(2, EvictionPolicy::FIFO);
        put(&store, "k1", "v1").await;
        put(&store, "k2", "v2").await;

        // Reads do not protect k1 under FIFO
        assert_eq!(get(&store, "k1").await, Some("v1"));
        put(&store, "k3", "v3").await;

        assert_eq!(get(&store, "k1").await, None);
        assert_eq!(get(&store, "k2").await, Some("v2"));
        assert_eq!(get(&store, "k3").await, Some("v3"));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let store = store(2, EvictionPolicy::LRU);
        put(&store, "k1", "v1").await;
        put(&store, "k2", "v2").await;

        // Touch k1 so k2 becomes least recently used
        assert_eq!(get(&store, "k1").await, Some("v1"));
        put(&store, "k3", "v3").await;

        assert_eq!(get(&store, "k1").await, Some("v1"));
        assert_eq!(get(&store, "k2").await, None);
        assert_eq!(get(&store, "k3").await, Some("v3"));
    }

    #[tokio::test]
    async fn test_lfu_eviction() {
        let store = store(2, EvictionPolicy::LFU);
        put(&store, "k1", "v1").await;
        put(&store, "k2", "v2").await;

        for _ in 0..5 {
            get(&store, "k1").await;
        }
        put(&store, "k3", "v3").await;

        assert_eq!(get(&store, "k1").await, Some("v1"));
        assert_eq!(get(&store, "k2").await, None);
    }

    #[tokio::test]
    async fn test_arc_eviction_keeps_hot_entry() {
        let store = store(3, EvictionPolicy::ARC);
        put(&store, "hot", "h").await;
        put(&store, "cold", "c").await;
        put(&store, "warm", "w").await;

        for _ in 0..10 {
            get(&store, "hot").await;
        }
        put(&store, "new", "n").await;

        assert_eq!(store.len(), 3);
        assert_eq!(get(&store, "hot").await, Some("h"));
        assert_eq!(get(&store, "cold").await, None);
    }

    #[tokio::test]
    async fn test_random_eviction_respects_limit() {
        let store = store(5, EvictionPolicy::Random);
        for (i, key) in ["a", "b", "c", "d", "e", "f", "g", "h"].iter().enumerate() {
            put(&store, key, if i % 2 == 0 { "even" } else { "odd" }).await;
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.order.lock().len(), 5);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let store = store(2, EvictionPolicy::LRU);
        put(&store, "k1", "v1").await;
        put(&store, "k2", "v2").await;
        put(&store, "k1", "v1b").await;

        assert_eq!(store.len(), 2);
        assert_eq!(get(&store, "k1").await, Some("v1b"));
        assert_eq!(get(&store, "k2").await, Some("v2"));
    }

    #[tokio::test]
    async fn test_expired_entries_reclaimed_before_eviction() {
        let store = store(2, EvictionPolicy::FIFO);
        let ctx = Context::background();
        put(&store, "keep", "k").await;
        store
            .mset(
                &ctx,
                HashMap::from([("short".to_string(), "s")]),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        put(&store, "new", "n").await;

        // "keep" is the oldest but "short" had already expired
        assert_eq!(get(&store, "keep").await, Some("k"));
        assert_eq!(get(&store, "new").await, Some("n"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_exists_and_del() {
        let store = store(10, EvictionPolicy::LRU);
        let ctx = Context::background();
        put(&store, "a", "1").await;

        let report = store
            .exists(&ctx, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(report, HashMap::from([("a".to_string(), true), ("b".to_string(), false)]));

        let removed = store
            .del(&ctx, &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.is_empty());
        assert!(store.order.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_store() {
        let store: BoundedStore<&'static str> = BoundedStore::new(BoundedStoreConfig::default());
        for key in ["a", "b", "c", "d"] {
            put(&store, key, "v").await;
        }
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = BoundedStoreConfig::builder().limit(0).build().unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_non_counting_reads_share_the_shard() {
        for policy in [EvictionPolicy::FIFO, EvictionPolicy::LRU, EvictionPolicy::Random] {
            let store = std::sync::Arc::new(store(4, policy));
            put(&store, "k", "v").await;

            let (tx, rx) = std::sync::mpsc::channel();
            let reader = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                // A shared reference to the entry stays alive during the read
                let _held = reader.map.get("k");
                let _ = tx.send(reader.read("k", Instant::now()));
            });

            let value = rx
                .recv_timeout(Duration::from_secs(2))
                .expect("read blocked behind a shared entry reference");
            assert_eq!(value, Some("v"), "policy {policy:?}");
        }
    }
}
