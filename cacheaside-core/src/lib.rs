//! # Cacheaside Core
//!
//! Building blocks shared by the `cacheaside` facade and by store adapters.
//!
//! ## Features
//!
//! - **Store contract**: The async [`Store`] trait every backend implements
//! - **Execution context**: Deadline and cancellation via [`Context`]
//! - **Value transfer**: Typed assignment plus [`Codec`]s for out-of-process stores
//! - **In-process stores**: [`MemoryStore`] (plain map) and [`BoundedStore`]
//!   (FIFO/LRU/LFU/ARC/Random eviction)
//! - **Encoded stores**: [`EncodedStore`] turns any byte store into a typed one
//! - **TTL Support**: Per-entry expiration, zero TTL meaning "never expires"
//! - **Statistics**: Hit/miss/fallback counters (with the `stats` feature)
//!
//! ## Module Organization
//!
//! - [`store`] - The storage contract
//! - [`context`] - Cancellable, deadline-bearing execution context
//! - [`transfer`] - Assignment helpers and codecs
//! - [`utils`] - Order-queue helpers for the eviction policies
//!
mod bounded_store;
mod cache_entry;
mod encoded_store;
mod error;
mod eviction_policy;
mod memory_store;
mod options;

pub mod context;
pub mod store;
pub mod transfer;
pub mod utils;

#[cfg(feature = "stats")]
mod stats;

pub use bounded_store::{BoundedStore, BoundedStoreConfig, BoundedStoreConfigBuilder};
pub use cache_entry::CacheEntry;
pub use context::{CancelHandle, Context};
pub use encoded_store::EncodedStore;
pub use error::{BoxError, CacheError, Result};
pub use eviction_policy::EvictionPolicy;
pub use memory_store::MemoryStore;
pub use options::CacheOptions;
pub use store::Store;
pub use transfer::{Codec, JsonCodec};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
