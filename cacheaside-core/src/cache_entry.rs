use std::time::{Duration, Instant};

/// A stored value together with its expiry and access bookkeeping.
///
/// Owned exclusively by the in-process stores; the cacher only ever observes
/// hit or miss.
///
/// # Fields
///
/// * `value` - The stored value
/// * `inserted_at` - When the entry was written
/// * `expires_at` - When the entry stops being visible (`None` = never)
/// * `frequency` - Number of reads served by this entry (LFU/ARC bookkeeping)
///
/// # Examples
///
/// ```
/// use cacheaside_core::CacheEntry;
/// use std::time::Duration;
///
/// let entry = CacheEntry::new(42, Duration::from_secs(60));
/// assert_eq!(entry.value, 42);
/// assert!(!entry.is_expired());
///
/// // A zero TTL never expires
/// let forever = CacheEntry::new("data", Duration::ZERO);
/// assert!(forever.expires_at.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub expires_at: Option<Instant>,
    pub frequency: u64,
}

impl<V> CacheEntry<V> {
    /// Creates an entry written now that lives for `ttl` (zero = no expiration).
    pub fn new(value: V, ttl: Duration) -> Self {
        let inserted_at = Instant::now();
        let expires_at = if ttl.is_zero() {
            None
        } else {
            inserted_at.checked_add(ttl)
        };
        Self {
            value,
            inserted_at,
            expires_at,
            frequency: 0,
        }
    }

    /// Returns true once the entry's expiry instant has been reached.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }

    /// Time left before expiry; `None` for entries without expiration.
    pub fn time_to_live(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    /// Increments the access frequency counter.
    pub fn increment_frequency(&mut self) {
        self.frequency = self.frequency.saturating_add(1);
    }
}
