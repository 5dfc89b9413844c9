//! Error taxonomy shared by stores, the value transfer layer and the cacher.
//!
//! Every fallible operation in the crate returns [`Result`]. A cache miss is never
//! an error: it is always expressed as `Ok(None)` / `Ok(false)`.

use thiserror::Error;

/// Boxed error used to carry backend and loader failures across the facade.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backend I/O or serialization failure. Fatal to the current call and never
    /// retried by the cacher.
    #[error("store error: {0}")]
    Store(#[source] BoxError),

    /// The caller-supplied loader failed. Always propagated, never masked as a miss.
    #[error("fallback error: {0}")]
    Fallback(#[source] BoxError),

    /// A stored value could not be decoded into the requested type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// The API was misused, e.g. `mrefresh` without a fallback.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The execution context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The execution context's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

impl CacheError {
    /// Wraps any backend error as a [`CacheError::Store`].
    pub fn store<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        CacheError::Store(err.into())
    }

    /// Wraps any loader error as a [`CacheError::Fallback`].
    pub fn fallback<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        CacheError::Fallback(err.into())
    }

    /// Returns `true` for errors raised by the execution context rather than by a
    /// store or loader.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CacheError::Cancelled | CacheError::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::store("connection reset");
        assert_eq!(err.to_string(), "store error: connection reset");

        let err = CacheError::fallback("row not readable");
        assert_eq!(err.to_string(), "fallback error: row not readable");

        let err = CacheError::InvalidArgument("fallback is required".to_string());
        assert_eq!(err.to_string(), "invalid argument: fallback is required");
    }

    #[test]
    fn test_cancellation_predicate() {
        assert!(CacheError::Cancelled.is_cancellation());
        assert!(CacheError::DeadlineExceeded.is_cancellation());
        assert!(!CacheError::store("boom").is_cancellation());
        assert!(!CacheError::TypeMismatch("i32".to_string()).is_cancellation());
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CacheError::store(io);
        let source = err.source().expect("store errors carry their source");
        assert_eq!(source.to_string(), "pipe closed");
    }
}
