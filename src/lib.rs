//! # Cacheaside
//!
//! A generic cache-aside facade for async Rust. A low-level key-value [`Store`]
//! (an in-process map, a bounded eviction cache, or an encoded byte store for a
//! remote backend) is wrapped by a [`Cacher`] that adds fallback-on-miss
//! loading, batch reconciliation, TTL policy and write-back.
//!
//! ## Features
//!
//! - **Read-through**: [`Cacher::get`] and [`Cacher::mget`] load misses through a
//!   caller-supplied [`Fallback`] / [`BatchFallback`] and write results back
//! - **Partial hits**: batch lookups only ask the fallback for the keys the store
//!   did not have
//! - **Forced reload**: [`Cacher::mrefresh`] overwrites cached values without a
//!   delete-then-load gap
//! - **TTL policy**: per-call TTL with a per-cacher default, zero meaning "never expires"
//! - **Stampede protection**: [`StampedeGuard`] runs at most one fallback per
//!   missing key under concurrency
//! - **Cancellation**: every store call and fallback is bounded by a [`Context`]
//! - **Statistics**: hit/miss/fallback counters (with the `stats` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use cacheaside::{CacheOptions, Cacher, CacherConfig, Context, MemoryStore};
//! use std::collections::{HashMap, HashSet};
//! use std::time::Duration;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # rt.block_on(async {
//! let config = CacherConfig::builder()
//!     .name("prices")
//!     .default_ttl(Duration::from_secs(60))
//!     .build()
//!     .unwrap();
//! let cacher = Cacher::with_config(MemoryStore::<u64>::new(), config);
//! let ctx = Context::with_timeout(Duration::from_secs(1));
//!
//! let load_prices = |keys: HashSet<String>| async move {
//!     let prices: HashMap<String, u64> = keys
//!         .into_iter()
//!         .filter(|k| k != "discontinued")
//!         .map(|k| (k, 100))
//!         .collect();
//!     Ok::<_, std::io::Error>(prices)
//! };
//!
//! let keys = vec!["apple".to_string(), "pear".to_string(), "discontinued".to_string()];
//! let mut prices = HashMap::new();
//! let opts = CacheOptions::with_ttl(Duration::from_secs(10));
//! cacher
//!     .mget(&ctx, &keys, &mut prices, Some(&load_prices), Some(&opts))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(prices.len(), 2);
//! assert!(!prices.contains_key("discontinued"));
//! # });
//! ```
//!
//! ## Stores
//!
//! | Store | Use |
//! |-------|-----|
//! | [`MemoryStore`] | Unbounded map, tests and small working sets |
//! | [`BoundedStore`] | Entry limit with FIFO/LRU/LFU/ARC/Random eviction |
//! | [`EncodedStore`] | Typed view over any `Store<Vec<u8>>` through a [`Codec`] |
//!
//! Any type implementing [`Store`] can back a cacher.
//!
//! ## Error Handling
//!
//! Store and fallback failures are returned as [`CacheError`] and are never
//! reported as a miss. The one lenient case is write-back: when a fallback
//! succeeded but the store rejected the write, the loaded value is still
//! returned and the failure is logged through `tracing`.
mod cacher;
mod config;
mod fallback;
mod keyed_mutex;
mod stampede;

pub use cacheaside_core::*;

pub use cacher::Cacher;
pub use config::{CacherConfig, CacherConfigBuilder};
pub use fallback::{BatchFallback, Fallback};
pub use keyed_mutex::KeyedMutex;
pub use stampede::{LoadSlot, StampedeGuard};
