use crate::config::CacherConfig;
use crate::fallback::{BatchFallback, Fallback};
use cacheaside_core::transfer::{assign, assign_all};
use cacheaside_core::{CacheError, CacheOptions, Context, Result, Store};
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "stats")]
use cacheaside_core::CacheStats;

/// Cache-aside facade over a [`Store`].
///
/// A `Cacher` composes one store with caller-supplied fallbacks to provide
/// read-through (`get`, `mget`), forced reload (`mrefresh`), write-through
/// (`mset`) and deletion (`mdelete`). It holds no mutable state besides its
/// statistics, so one instance is meant to be built at startup and shared.
///
/// # Type Parameters
///
/// * `V` - The cached value type. One cacher serves exactly one value type.
/// * `S` - The backing store.
///
/// # Outcomes
///
/// Every lookup ends in one of `Ok(true)` (hit or fallback hit), `Ok(false)`
/// (miss) or `Err(_)`. A miss is only ever "absent from the store and the
/// fallback said not found"; store and fallback errors are never turned into
/// misses.
///
/// # Write-back policy
///
/// When a fallback succeeds but writing its result to the store fails, the
/// failure is logged at `warn` level and the loaded value is still returned.
/// Cancellation is the exception: a cancelled or expired context always fails
/// the call.
///
/// # Examples
///
/// ```
/// use cacheaside::{Cacher, Context, MemoryStore};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let cacher = Cacher::new(MemoryStore::<String>::new());
/// let ctx = Context::background();
///
/// let loader = |key: String| async move {
///     Ok::<_, std::io::Error>(Some(format!("profile of {key}")))
/// };
///
/// let mut dest = String::new();
/// let found = cacher.get(&ctx, "user:7", &mut dest, Some(&loader), None).await.unwrap();
/// assert!(found);
/// assert_eq!(dest, "profile of user:7");
///
/// // Served from the store this time
/// let mut again = String::new();
/// assert!(cacher.get(&ctx, "user:7", &mut again, None, None).await.unwrap());
/// assert_eq!(again, dest);
/// # });
/// ```
pub struct Cacher<V, S> {
    store: S,
    config: CacherConfig,
    #[cfg(feature = "stats")]
    stats: CacheStats,
    _value: PhantomData<fn() -> V>,
}

impl<V, S> Cacher<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Store<V>,
{
    /// Creates a cacher with the default configuration (no expiration).
    pub fn new(store: S) -> Self {
        Self::with_config(store, CacherConfig::default())
    }

    pub fn with_config(store: S, config: CacherConfig) -> Self {
        Self {
            store,
            config,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
            _value: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CacherConfig {
        &self.config
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Looks up `key`, falling back to `fallback` on a miss.
    ///
    /// On a fallback hit the value is written to the store with the effective
    /// TTL (the call's TTL if positive, otherwise the configured default) and
    /// moved into `dest`. A fallback that reports "not found" is a miss and
    /// nothing is cached. Store read errors fail fast without consulting the
    /// fallback.
    ///
    /// `dest` is only written when the call returns `Ok(true)`.
    pub async fn get(
        &self,
        ctx: &Context,
        key: &str,
        dest: &mut V,
        fallback: Option<&dyn Fallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<bool> {
        if self.lookup(ctx, key, dest).await? {
            return Ok(true);
        }

        match fallback {
            Some(fallback) => self.load_into(ctx, key, dest, fallback, opts).await,
            None => {
                debug!(cache = %self.config.name, key, "miss without fallback");
                Ok(false)
            }
        }
    }

    /// Looks up `keys` in one store round-trip, loading the missing ones through
    /// `fallback`.
    ///
    /// Hits are merged into `dest` first. If a fallback is given and some keys
    /// are missing, it is called once with the missing set; whatever it returns
    /// is written back and merged. Keys found nowhere stay absent from `dest`.
    /// A fallback error is returned, but store hits already merged into `dest`
    /// remain valid.
    pub async fn mget(
        &self,
        ctx: &Context,
        keys: &[String],
        dest: &mut HashMap<String, V>,
        fallback: Option<&dyn BatchFallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let found = ctx.run(self.store.mget(ctx, keys)).await?;
        let missing: HashSet<String> = keys
            .iter()
            .filter(|key| !found.contains_key(*key))
            .cloned()
            .collect();

        #[cfg(feature = "stats")]
        {
            self.stats.record_hits(found.len() as u64);
            self.stats.record_misses(missing.len() as u64);
        }
        debug!(
            cache = %self.config.name,
            hits = found.len(),
            missing = missing.len(),
            "batch lookup"
        );
        assign_all(dest, found);

        let Some(fallback) = fallback else {
            return Ok(());
        };
        if missing.is_empty() {
            return Ok(());
        }

        let loaded = self.load_many(ctx, fallback, missing).await?;
        if loaded.is_empty() {
            return Ok(());
        }

        let ttl = self.effective_ttl(opts);
        self.write_back(ctx, loaded.clone(), ttl).await?;
        assign_all(dest, loaded);
        Ok(())
    }

    /// Deletes `keys` and returns how many existed.
    pub async fn mdelete(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let removed = ctx.run(self.store.del(ctx, keys)).await?;
        debug!(cache = %self.config.name, requested = keys.len(), removed, "deleted keys");
        Ok(removed)
    }

    /// Reloads `keys` from `fallback` regardless of what the store holds.
    ///
    /// The store is not read first and nothing is deleted up front: fresh values
    /// overwrite the cached ones, so concurrent readers never observe a gap.
    /// `dest` receives exactly the entries the fallback returned.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] when `fallback` is `None` and `keys` is
    /// not empty.
    pub async fn mrefresh(
        &self,
        ctx: &Context,
        keys: &[String],
        dest: &mut HashMap<String, V>,
        fallback: Option<&dyn BatchFallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let Some(fallback) = fallback else {
            return Err(CacheError::InvalidArgument(
                "mrefresh requires a batch fallback".to_string(),
            ));
        };

        let requested: HashSet<String> = keys.iter().cloned().collect();
        let loaded = self.load_many(ctx, fallback, requested).await?;

        if !loaded.is_empty() {
            let ttl = self.effective_ttl(opts);
            self.write_back(ctx, loaded.clone(), ttl).await?;
        }
        assign_all(dest, loaded);
        Ok(())
    }

    /// Writes `items` through to the store with the effective TTL.
    ///
    /// Unlike a write-back after a fallback, store errors here are returned.
    pub async fn mset(
        &self,
        ctx: &Context,
        items: HashMap<String, V>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let ttl = self.effective_ttl(opts);
        ctx.run(self.store.mset(ctx, items, ttl)).await
    }

    /// Reports which of `keys` are currently cached.
    pub async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        ctx.run(self.store.exists(ctx, keys)).await
    }

    /// Store read for one key. Moves the value into `dest` on a hit.
    pub(crate) async fn lookup(&self, ctx: &Context, key: &str, dest: &mut V) -> Result<bool> {
        match ctx.run(self.store.get(ctx, key)).await? {
            Some(value) => {
                #[cfg(feature = "stats")]
                self.stats.record_hit();
                debug!(cache = %self.config.name, key, "hit");
                assign(dest, value);
                Ok(true)
            }
            None => {
                #[cfg(feature = "stats")]
                self.stats.record_miss();
                Ok(false)
            }
        }
    }

    /// Runs the single-key fallback and writes a found value back.
    async fn load_into(
        &self,
        ctx: &Context,
        key: &str,
        dest: &mut V,
        fallback: &dyn Fallback<V>,
        opts: Option<&CacheOptions>,
    ) -> Result<bool> {
        match self.load_one(ctx, key, fallback, opts).await? {
            Some(value) => {
                assign(dest, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs the single-key fallback and writes a found value back, returning
    /// what the fallback produced.
    pub(crate) async fn load_one(
        &self,
        ctx: &Context,
        key: &str,
        fallback: &dyn Fallback<V>,
        opts: Option<&CacheOptions>,
    ) -> Result<Option<V>> {
        #[cfg(feature = "stats")]
        self.stats.record_fallback_load();

        let loaded = ctx
            .run(async {
                fallback
                    .load(key.to_string())
                    .await
                    .map_err(CacheError::Fallback)
            })
            .await?;

        let Some(value) = loaded else {
            debug!(cache = %self.config.name, key, "fallback found nothing");
            return Ok(None);
        };

        let ttl = self.effective_ttl(opts);
        let items = HashMap::from([(key.to_string(), value.clone())]);
        self.write_back(ctx, items, ttl).await?;

        debug!(cache = %self.config.name, key, ttl = ?ttl, "fallback hit");
        Ok(Some(value))
    }

    async fn load_many(
        &self,
        ctx: &Context,
        fallback: &dyn BatchFallback<V>,
        keys: HashSet<String>,
    ) -> Result<HashMap<String, V>> {
        #[cfg(feature = "stats")]
        self.stats.record_fallback_load();

        let requested = keys.len();
        let loaded = ctx
            .run(async {
                fallback
                    .load_many(keys)
                    .await
                    .map_err(CacheError::Fallback)
            })
            .await?;
        debug!(
            cache = %self.config.name,
            requested,
            loaded = loaded.len(),
            "batch fallback"
        );
        Ok(loaded)
    }

    /// Best-effort store write after a successful fallback.
    async fn write_back(
        &self,
        ctx: &Context,
        items: HashMap<String, V>,
        ttl: Duration,
    ) -> Result<()> {
        let count = items.len();
        match ctx.run(self.store.mset(ctx, items, ttl)).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancellation() => Err(err),
            Err(err) => {
                #[cfg(feature = "stats")]
                self.stats.record_write_back_failure();
                warn!(
                    cache = %self.config.name,
                    keys = count,
                    error = %err,
                    "write-back failed, serving loaded value"
                );
                Ok(())
            }
        }
    }

    fn effective_ttl(&self, opts: Option<&CacheOptions>) -> Duration {
        CacheOptions::resolve(opts, self.config.default_ttl)
    }
}
