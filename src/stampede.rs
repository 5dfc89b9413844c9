use crate::cacher::Cacher;
use crate::fallback::{BatchFallback, Fallback};
use crate::keyed_mutex::KeyedMutex;
use cacheaside_core::transfer::assign;
use cacheaside_core::{CacheError, CacheOptions, Context, Result, Store};
use std::collections::HashMap;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of the last successful single-key load, kept next to the key's lock.
///
/// Waiters queued behind a loader read it from here, so they are served even
/// when the loader's write-back never reached the store.
pub struct LoadSlot<V> {
    loaded: Option<(Instant, Option<V>)>,
}

impl<V> Default for LoadSlot<V> {
    fn default() -> Self {
        Self { loaded: None }
    }
}

impl<V: Clone> LoadSlot<V> {
    /// The result of a load that finished after `arrived`, if any.
    ///
    /// The last reader in line takes the value out of the slot.
    fn since(&mut self, arrived: Instant, last_reader: bool) -> Option<Option<V>> {
        match &self.loaded {
            Some((finished, _)) if *finished > arrived => {}
            _ => return None,
        }
        if last_reader {
            self.loaded.take().map(|(_, value)| value)
        } else {
            self.loaded.as_ref().map(|(_, value)| value.clone())
        }
    }

    fn publish(&mut self, value: Option<V>) {
        self.loaded = Some((Instant::now(), value));
    }
}

/// A [`Cacher`] that runs at most one single-key fallback per missing key.
///
/// Concurrent [`get`](Self::get) calls that miss on the same key queue on a
/// per-key lock. The first one loads and writes back, then leaves its result
/// in the key's [`LoadSlot`]; callers that were already queued take it from
/// there, whether or not the write-back succeeded. A caller that arrives after
/// the load finished re-checks the store instead. Batch operations are passed
/// through to the wrapped cacher unguarded.
///
/// Only successful loads (found or not found) are shared. If the loader fails,
/// the next queued caller tries again.
///
/// A caller whose context ends while queued gives up with the context's error
/// and never runs the fallback.
pub struct StampedeGuard<V, S> {
    cacher: Cacher<V, S>,
    locks: KeyedMutex<LoadSlot<V>>,
}

impl<V, S> StampedeGuard<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Store<V>,
{
    pub fn new(cacher: Cacher<V, S>) -> Self {
        Self {
            cacher,
            locks: KeyedMutex::default(),
        }
    }

    pub fn cacher(&self) -> &Cacher<V, S> {
        &self.cacher
    }

    /// The per-key lock table, e.g. for [`KeyedMutex::prune_idle`].
    pub fn locks(&self) -> &KeyedMutex<LoadSlot<V>> {
        &self.locks
    }

    /// Same contract as [`Cacher::get`], with concurrent misses on `key`
    /// collapsed into one fallback call.
    pub async fn get(
        &self,
        ctx: &Context,
        key: &str,
        dest: &mut V,
        fallback: Option<&dyn Fallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<bool> {
        let arrived = Instant::now();
        if self.cacher.lookup(ctx, key, dest).await? {
            return Ok(true);
        }
        let Some(fallback) = fallback else {
            return Ok(false);
        };

        let mut slot = ctx
            .run(async { Ok::<_, CacheError>(self.locks.lock(key).await) })
            .await?;

        let last_reader = !has_waiters(&slot);
        if let Some(shared) = slot.since(arrived, last_reader) {
            debug!(cache = %self.cacher.config().name, key, "served by concurrent loader");
            return Ok(match shared {
                Some(value) => {
                    assign(dest, value);
                    true
                }
                None => false,
            });
        }

        // Fast path: an earlier holder's write-back landed
        if self.cacher.lookup(ctx, key, dest).await? {
            return Ok(true);
        }

        let loaded = self.cacher.load_one(ctx, key, fallback, opts).await?;
        slot.publish(loaded.clone());
        Ok(match loaded {
            Some(value) => {
                assign(dest, value);
                true
            }
            None => false,
        })
    }

    pub async fn mget(
        &self,
        ctx: &Context,
        keys: &[String],
        dest: &mut HashMap<String, V>,
        fallback: Option<&dyn BatchFallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        self.cacher.mget(ctx, keys, dest, fallback, opts).await
    }

    pub async fn mdelete(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        self.cacher.mdelete(ctx, keys).await
    }

    pub async fn mrefresh(
        &self,
        ctx: &Context,
        keys: &[String],
        dest: &mut HashMap<String, V>,
        fallback: Option<&dyn BatchFallback<V>>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        self.cacher.mrefresh(ctx, keys, dest, fallback, opts).await
    }

    pub async fn mset(
        &self,
        ctx: &Context,
        items: HashMap<String, V>,
        opts: Option<&CacheOptions>,
    ) -> Result<()> {
        self.cacher.mset(ctx, items, opts).await
    }

    pub async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        self.cacher.exists(ctx, keys).await
    }
}

/// Whether anyone besides the holder and the lock table references the lock.
fn has_waiters<T>(guard: &OwnedMutexGuard<T>) -> bool {
    std::sync::Arc::strong_count(OwnedMutexGuard::mutex(guard)) > 2
}

impl<V, S> From<Cacher<V, S>> for StampedeGuard<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: Store<V>,
{
    fn from(cacher: Cacher<V, S>) -> Self {
        Self::new(cacher)
    }
}
