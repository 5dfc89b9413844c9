use std::time::Duration;

/// Per-call caching options.
///
/// A zero `ttl` defers to the cacher's configured default; a zero TTL reaching a
/// store means "no expiration".
///
/// # Examples
///
/// ```
/// use cacheaside_core::CacheOptions;
/// use std::time::Duration;
///
/// let opts = CacheOptions::with_ttl(Duration::from_secs(30));
/// assert_eq!(opts.effective_ttl(Duration::from_secs(600)), Duration::from_secs(30));
///
/// let opts = CacheOptions::default();
/// assert_eq!(opts.effective_ttl(Duration::from_secs(600)), Duration::from_secs(600));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl: Duration,
}

impl CacheOptions {
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Returns the call TTL when set, otherwise `default_ttl`.
    pub fn effective_ttl(&self, default_ttl: Duration) -> Duration {
        if self.ttl.is_zero() {
            default_ttl
        } else {
            self.ttl
        }
    }

    /// Resolves optional call options against a default TTL.
    pub fn resolve(opts: Option<&CacheOptions>, default_ttl: Duration) -> Duration {
        opts.map_or(default_ttl, |opts| opts.effective_ttl(default_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_options_use_default() {
        let default_ttl = Duration::from_secs(60);
        assert_eq!(CacheOptions::resolve(None, default_ttl), default_ttl);
    }

    #[test]
    fn test_zero_ttl_uses_default() {
        let opts = CacheOptions::default();
        assert_eq!(
            CacheOptions::resolve(Some(&opts), Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_positive_ttl_overrides_default() {
        let opts = CacheOptions::with_ttl(Duration::from_millis(250));
        assert_eq!(
            CacheOptions::resolve(Some(&opts), Duration::from_secs(5)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_zero_everywhere_means_no_expiration() {
        assert!(CacheOptions::resolve(None, Duration::ZERO).is_zero());
    }
}
