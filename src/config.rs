//! Configuration for [`Cacher`](crate::Cacher) instances.

use cacheaside_core::{CacheError, Result};
use std::time::Duration;

/// Configuration for a cacher.
///
/// A zero `default_ttl` stores fallback results without expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacherConfig {
    /// Name reported in log records
    pub name: String,

    /// TTL applied when a call does not supply one
    pub default_ttl: Duration,
}

impl Default for CacherConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            default_ttl: Duration::ZERO,
        }
    }
}

impl CacherConfig {
    /// Create a new builder for cacher configuration
    pub fn builder() -> CacherConfigBuilder {
        CacherConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CacheError::InvalidArgument(
                "cacher name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CacherConfig`] with validation.
///
/// # Examples
///
/// ```
/// use cacheaside::CacherConfig;
/// use std::time::Duration;
///
/// let config = CacherConfig::builder()
///     .name("users")
///     .default_ttl(Duration::from_secs(300))
///     .build()
///     .unwrap();
/// assert_eq!(config.name, "users");
///
/// assert!(CacherConfig::builder().name("  ").build().is_err());
/// ```
#[derive(Debug, Default)]
pub struct CacherConfigBuilder {
    name: Option<String>,
    default_ttl: Option<Duration>,
}

impl CacherConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the TTL used when a call passes no TTL (zero = no expiration)
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Result<CacherConfig> {
        let defaults = CacherConfig::default();
        let config = CacherConfig {
            name: self.name.unwrap_or(defaults.name),
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
        };
        config.validate()?;
        Ok(config)
    }
}
