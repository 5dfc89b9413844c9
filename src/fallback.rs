//! Loaders invoked on a cache miss.
//!
//! Closures implement both traits directly, so most callers never name them:
//!
//! ```
//! use cacheaside::{BatchFallback, Fallback};
//! use std::collections::{HashMap, HashSet};
//!
//! fn takes_single(_: &dyn Fallback<String>) {}
//! fn takes_batch(_: &dyn BatchFallback<u64>) {}
//!
//! takes_single(&|key: String| async move {
//!     Ok::<_, std::io::Error>(Some(format!("loaded {key}")))
//! });
//!
//! takes_batch(&|keys: HashSet<String>| async move {
//!     Ok::<_, std::io::Error>(keys.into_iter().map(|k| (k, 1u64)).collect::<HashMap<_, _>>())
//! });
//! ```
//!
//! A closure's future must own what it uses. A loader that borrows, such as a
//! database handle owned by the caller, implements the trait on a struct:
//!
//! ```
//! use async_trait::async_trait;
//! use cacheaside::{BoxError, Fallback};
//! use std::collections::HashMap;
//!
//! struct Directory<'a> {
//!     rows: &'a HashMap<String, String>,
//! }
//!
//! #[async_trait]
//! impl Fallback<String> for Directory<'_> {
//!     async fn load(&self, key: String) -> Result<Option<String>, BoxError> {
//!         Ok(self.rows.get(&key).cloned())
//!     }
//! }
//!
//! let rows = HashMap::from([("7".to_string(), "ada".to_string())]);
//! let loader: &dyn Fallback<String> = &Directory { rows: &rows };
//! # let _ = loader;
//! ```

use async_trait::async_trait;
use cacheaside_core::BoxError;
use std::collections::{HashMap, HashSet};
use std::future::Future;

/// Loads the authoritative value for one key.
///
/// `Ok(None)` means the value does not exist; absent values are never cached.
#[async_trait]
pub trait Fallback<V>: Send + Sync {
    async fn load(&self, key: String) -> Result<Option<V>, BoxError>;
}

/// Loads the authoritative values for a set of keys.
///
/// The returned map may be a strict subset of `keys`; omitted keys are simply
/// absent and never an error.
#[async_trait]
pub trait BatchFallback<V>: Send + Sync {
    async fn load_many(&self, keys: HashSet<String>) -> Result<HashMap<String, V>, BoxError>;
}

#[async_trait]
impl<V, F, Fut, E> Fallback<V> for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<V>, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
    V: Send + 'static,
{
    async fn load(&self, key: String) -> Result<Option<V>, BoxError> {
        (self)(key).await.map_err(Into::into)
    }
}

#[async_trait]
impl<V, F, Fut, E> BatchFallback<V> for F
where
    F: Fn(HashSet<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HashMap<String, V>, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
    V: Send + 'static,
{
    async fn load_many(&self, keys: HashSet<String>) -> Result<HashMap<String, V>, BoxError> {
        (self)(keys).await.map_err(Into::into)
    }
}
