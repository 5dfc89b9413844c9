/// Policy used by [`BoundedStore`](crate::BoundedStore) to pick a victim when the
/// entry limit is reached.
///
/// # Variants
///
/// * `FIFO` - **First In, First Out**
///   - The oldest inserted entry is removed first
///   - Reads do NOT change an entry's position
///
/// * `LRU` - **Least Recently Used** (default)
///   - The least recently read or written entry is removed first
///   - Reads move the entry to the "most recent" position
///
/// * `LFU` - **Least Frequently Used**
///   - The entry with the lowest read count is removed first
///
/// * `ARC` - **Adaptive Replacement**
///   - Hybrid score of frequency and recency (`frequency × position_weight`)
///   - Reads bump both the counter and the position
///
/// * `Random` - uniform random victim, O(1)
///
/// # Examples
///
/// ```
/// use cacheaside_core::EvictionPolicy;
///
/// assert_eq!(EvictionPolicy::default(), EvictionPolicy::LRU);
///
/// let policy: EvictionPolicy = "arc".into();
/// assert_eq!(policy, EvictionPolicy::ARC);
///
/// let unknown: EvictionPolicy = "mru".into();
/// assert_eq!(unknown, EvictionPolicy::LRU); // defaults to LRU
/// ```
///
/// # Performance Characteristics
///
/// | Policy | Eviction | Read hit |
/// |--------|----------|----------|
/// | FIFO   | O(1)     | O(1)     |
/// | LRU    | O(1)     | O(n)     |
/// | LFU    | O(n)     | O(1)     |
/// | ARC    | O(n)     | O(n)     |
/// | Random | O(1)     | O(1)     |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvictionPolicy {
    FIFO,
    #[default]
    LRU,
    LFU,
    ARC,
    Random,
}

impl EvictionPolicy {
    /// Whether a read hit moves the key to the back of the order queue.
    pub const fn reorders_on_read(self) -> bool {
        matches!(self, EvictionPolicy::LRU | EvictionPolicy::ARC)
    }

    /// Whether a read hit increments the entry's frequency counter.
    pub const fn counts_reads(self) -> bool {
        matches!(self, EvictionPolicy::LFU | EvictionPolicy::ARC)
    }
}

/// Converts a string slice to an `EvictionPolicy`.
///
/// Case-insensitive; unrecognized values fall back to LRU.
impl From<&str> for EvictionPolicy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fifo" => EvictionPolicy::FIFO,
            "lfu" => EvictionPolicy::LFU,
            "arc" => EvictionPolicy::ARC,
            "random" => EvictionPolicy::Random,
            _ => EvictionPolicy::LRU,
        }
    }
}
