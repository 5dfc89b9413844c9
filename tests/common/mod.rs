//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use cacheaside::{CacheError, Context, MemoryStore, Result, Store};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One call observed by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    MGet(Vec<String>),
    Exists(Vec<String>),
    MSet { keys: Vec<String>, ttl: Duration },
    Del(Vec<String>),
}

/// A [`MemoryStore`] that records every call and can be told to reject writes.
pub struct RecordingStore<V> {
    inner: MemoryStore<V>,
    calls: Mutex<Vec<Call>>,
    fail_writes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl<V> RecordingStore<V> {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            write_delay: Mutex::new(None),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every `mset` sleep for `delay` before writing.
    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// TTLs of every `mset` call, in order.
    pub fn write_ttls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::MSet { ttl, .. } => Some(*ttl),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl<V> Store<V> for RecordingStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>> {
        self.record(Call::Get(key.to_string()));
        self.inner.get(ctx, key).await
    }

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>> {
        self.record(Call::MGet(keys.to_vec()));
        self.inner.mget(ctx, keys).await
    }

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        self.record(Call::Exists(keys.to_vec()));
        self.inner.exists(ctx, keys).await
    }

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()> {
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        self.record(Call::MSet { keys, ttl });
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::store("backend is read-only"));
        }
        self.inner.mset(ctx, items, ttl).await
    }

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        self.record(Call::Del(keys.to_vec()));
        self.inner.del(ctx, keys).await
    }
}

pub fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
