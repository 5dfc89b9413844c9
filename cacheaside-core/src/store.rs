//! The storage contract consumed by the cacher.
//!
//! A [`Store`] is pure storage access: no fallback, no TTL policy beyond honouring
//! the TTL passed to [`Store::mset`]. Implementations must be safe for concurrent
//! use and treat every call as atomic from the caller's point of view.

use crate::context::Context;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Key-value storage for values of type `V`.
///
/// # Contract
///
/// - `get` returns `Ok(None)` for an absent key and only fails on backend errors.
/// - `mget` returns only the keys that are present; an empty `keys` slice is a no-op.
/// - `exists` reports every requested key exactly once.
/// - `mset` with a zero `ttl` stores entries without expiration. A partial write is
///   reported as an error covering the whole call.
/// - `del` returns how many of the keys existed and were removed; absent keys are
///   not an error.
#[async_trait]
pub trait Store<V>: Send + Sync
where
    V: Send + Sync + 'static,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>>;

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>>;

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>>;

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()>;

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64>;
}

#[async_trait]
impl<V, S> Store<V> for Arc<S>
where
    V: Send + Sync + 'static,
    S: Store<V> + ?Sized,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>> {
        (**self).get(ctx, key).await
    }

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>> {
        (**self).mget(ctx, keys).await
    }

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        (**self).exists(ctx, keys).await
    }

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()> {
        (**self).mset(ctx, items, ttl).await
    }

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        (**self).del(ctx, keys).await
    }
}
