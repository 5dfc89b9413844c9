//! Value transfer between stored representations and caller destinations.
//!
//! In-process stores hold `V` directly, so moving a value into a destination is a
//! plain, type-checked assignment. Only stores that persist out of process go
//! through a [`Codec`], and that is the one place a shape mismatch can still occur.

use crate::error::{CacheError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Moves `value` into `dest`.
#[inline]
pub fn assign<V>(dest: &mut V, value: V) {
    *dest = value;
}

/// Merges `entries` into `dest`, overwriting keys already present.
pub fn assign_all<V, I>(dest: &mut HashMap<String, V>, entries: I)
where
    I: IntoIterator<Item = (String, V)>,
{
    dest.extend(entries);
}

/// Byte encoding for values crossing a process boundary.
pub trait Codec: Send + Sync + 'static {
    fn encode<V: Serialize>(&self, value: &V) -> Result<Vec<u8>>;

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<V>;
}

/// JSON encoding via `serde_json`.
///
/// Payloads that parse but do not fit the destination type are reported as
/// [`CacheError::TypeMismatch`]; malformed payloads are store errors.
///
/// # Examples
///
/// ```
/// use cacheaside_core::{Codec, JsonCodec, CacheError};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&vec![1u32, 2, 3]).unwrap();
/// let back: Vec<u32> = codec.decode(&bytes).unwrap();
/// assert_eq!(back, vec![1, 2, 3]);
///
/// let err = codec.decode::<u32>(b"\"text\"").unwrap_err();
/// assert!(matches!(err, CacheError::TypeMismatch(_)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<V: Serialize>(&self, value: &V) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(CacheError::store)
    }

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<V> {
        serde_json::from_slice(bytes).map_err(|err| match err.classify() {
            serde_json::error::Category::Data => CacheError::TypeMismatch(format!(
                "cannot decode into {}: {}",
                std::any::type_name::<V>(),
                err
            )),
            _ => CacheError::store(err),
        })
    }
}
