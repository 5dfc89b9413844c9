use crate::{Codec, Context, JsonCodec, Result, Store};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Adapts a byte-oriented store into a typed [`Store`] through a [`Codec`].
///
/// This is the shape of an out-of-process backend: the inner store speaks
/// `Vec<u8>` (a remote cache client, typically), and every typed value is
/// encoded on the way in and decoded on the way out. A single `EncodedStore`
/// serves any `V: Serialize + DeserializeOwned`.
///
/// A payload that decodes into the wrong shape fails the whole call with
/// [`CacheError::TypeMismatch`](crate::CacheError::TypeMismatch).
///
/// # Examples
///
/// ```
/// use cacheaside_core::{Context, EncodedStore, MemoryStore, Store};
/// use std::collections::HashMap;
/// use std::time::Duration;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let bytes: MemoryStore<Vec<u8>> = MemoryStore::new();
/// let store = EncodedStore::json(bytes);
/// let ctx = Context::background();
///
/// let items = HashMap::from([("point".to_string(), (3i32, 4i32))]);
/// store.mset(&ctx, items, Duration::ZERO).await.unwrap();
///
/// let point: Option<(i32, i32)> = store.get(&ctx, "point").await.unwrap();
/// assert_eq!(point, Some((3, 4)));
/// # });
/// ```
pub struct EncodedStore<S, C = JsonCodec> {
    inner: S,
    codec: C,
}

impl<S> EncodedStore<S, JsonCodec> {
    /// Wraps `inner` with JSON encoding.
    pub fn json(inner: S) -> Self {
        Self::new(inner, JsonCodec)
    }
}

impl<S, C> EncodedStore<S, C> {
    pub fn new(inner: S, codec: C) -> Self {
        Self { inner, codec }
    }

    /// The underlying byte store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S, C, V> Store<V> for EncodedStore<S, C>
where
    S: Store<Vec<u8>>,
    C: Codec,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, ctx: &Context, key: &str) -> Result<Option<V>> {
        match self.inner.get(ctx, key).await? {
            Some(bytes) => self.codec.decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn mget(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, V>> {
        let raw = self.inner.mget(ctx, keys).await?;
        raw.into_iter()
            .map(|(key, bytes)| self.codec.decode(&bytes).map(|value| (key, value)))
            .collect()
    }

    async fn exists(&self, ctx: &Context, keys: &[String]) -> Result<HashMap<String, bool>> {
        self.inner.exists(ctx, keys).await
    }

    async fn mset(&self, ctx: &Context, items: HashMap<String, V>, ttl: Duration) -> Result<()> {
        let encoded = items
            .iter()
            .map(|(key, value)| self.codec.encode(value).map(|bytes| (key.clone(), bytes)))
            .collect::<Result<HashMap<_, _>>>()?;
        self.inner.mset(ctx, encoded, ttl).await
    }

    async fn del(&self, ctx: &Context, keys: &[String]) -> Result<i64> {
        self.inner.del(ctx, keys).await
    }
}
