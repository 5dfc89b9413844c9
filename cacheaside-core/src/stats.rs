use std::sync::atomic::{AtomicU64, Ordering};

/// Cacher statistics for monitoring hit/miss rates and fallback activity.
///
/// All counters are atomics updated with `Relaxed` ordering.
///
/// # Examples
///
/// ```
/// use cacheaside_core::CacheStats;
///
/// let stats = CacheStats::new();
///
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
/// stats.record_fallback_load();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.fallback_loads(), 1);
/// assert_eq!(stats.total_accesses(), 3);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    fallback_loads: AtomicU64,
    write_back_failures: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` instance with zero counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records keys served straight from the store.
    #[inline]
    pub fn record_hits(&self, count: u64) {
        self.hits.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_hit(&self) {
        self.record_hits(1);
    }

    /// Records keys the store did not have.
    #[inline]
    pub fn record_misses(&self, count: u64) {
        self.misses.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.record_misses(1);
    }

    /// Records one fallback invocation (single or batch).
    #[inline]
    pub fn record_fallback_load(&self) {
        self.fallback_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a store write after a successful fallback that failed and was
    /// swallowed.
    #[inline]
    pub fn record_write_back_failure(&self) {
        self.write_back_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fallback_loads(&self) -> u64 {
        self.fallback_loads.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_back_failures(&self) -> u64 {
        self.write_back_failures.load(Ordering::Relaxed)
    }

    /// Returns the total number of key lookups (hits + misses).
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Hit ratio in `0.0..=1.0`; 0.0 before any access.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Miss ratio in `0.0..=1.0`; 0.0 before any access.
    #[inline]
    pub fn miss_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.misses() as f64 / total as f64
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.fallback_loads.store(0, Ordering::Relaxed);
        self.write_back_failures.store(0, Ordering::Relaxed);
    }
}
