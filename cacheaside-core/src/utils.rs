//! Order-queue helpers shared by the eviction policies of
//! [`BoundedStore`](crate::BoundedStore).
//!
//! The order queue holds keys from oldest (front) to most recent (back).

use crate::CacheEntry;
use dashmap::DashMap;
use std::collections::VecDeque;

/// Moves a key to the end of the order queue (marks it as most recently used).
///
/// Missing keys leave the queue unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::VecDeque;
/// use cacheaside_core::utils::move_key_to_end;
///
/// let mut order = VecDeque::from(vec!["key1".to_string(), "key2".to_string(), "key3".to_string()]);
/// move_key_to_end(&mut order, "key2");
/// assert_eq!(order.back().unwrap(), "key2");
/// ```
pub fn move_key_to_end(order: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        if let Some(moved) = order.remove(pos) {
            order.push_back(moved);
        }
    }
}

/// Removes every occurrence of `key` from the order queue.
pub fn remove_from_order(order: &mut VecDeque<String>, key: &str) {
    order.retain(|k| k != key);
}

/// Finds the key with the lowest access frequency.
///
/// Ties go to the older key (closer to the front). Keys in the queue that are no
/// longer in the map are skipped.
///
/// # Examples
///
/// ```
/// use std::collections::VecDeque;
/// use std::time::Duration;
/// use dashmap::DashMap;
/// use cacheaside_core::{CacheEntry, utils::find_min_frequency_key};
///
/// let map = DashMap::new();
/// let mut hot = CacheEntry::new(1, Duration::ZERO);
/// hot.frequency = 5;
/// map.insert("hot".to_string(), hot);
/// map.insert("cold".to_string(), CacheEntry::new(2, Duration::ZERO));
///
/// let order = VecDeque::from(vec!["hot".to_string(), "cold".to_string()]);
/// assert_eq!(find_min_frequency_key(&map, &order), Some("cold".to_string()));
/// ```
pub fn find_min_frequency_key<V>(
    map: &DashMap<String, CacheEntry<V>>,
    order: &VecDeque<String>,
) -> Option<String> {
    let mut min_freq_key: Option<String> = None;
    let mut min_freq = u64::MAX;

    for evict_key in order.iter() {
        if let Some(entry) = map.get(evict_key) {
            if entry.frequency < min_freq {
                min_freq = entry.frequency;
                min_freq_key = Some(evict_key.clone());
            }
        }
    }

    min_freq_key
}

/// Finds the key with the lowest ARC score.
///
/// `score = (frequency + 1) × position_weight`, where the position weight grows
/// from 1 at the front of the queue to `len` at the back. Old, rarely read
/// entries score lowest.
pub fn find_arc_eviction_key<V>(
    map: &DashMap<String, CacheEntry<V>>,
    order: &VecDeque<String>,
) -> Option<String> {
    let mut best_evict_key: Option<String> = None;
    let mut best_score = f64::MAX;

    for (idx, evict_key) in order.iter().enumerate() {
        if let Some(entry) = map.get(evict_key) {
            let frequency = entry.frequency as f64 + 1.0;
            let position_weight = (idx + 1) as f64;
            let score = frequency * position_weight;

            if score < best_score {
                best_score = score;
                best_evict_key = Some(evict_key.clone());
            }
        }
    }

    best_evict_key
}
